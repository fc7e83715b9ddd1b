use super::steps::AgentStep;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Steps taken so far within the current turn
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkingMemory {
    steps: Vec<AgentStep>,
}

impl WorkingMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step to memory
    pub fn add_step(&mut self, step: AgentStep) {
        info!(target: "travel::steps", "{}", step.describe());
        self.steps.push(step);
    }

    /// Get all steps
    pub fn steps(&self) -> &[AgentStep] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<AgentStep> {
        self.steps
    }

    pub fn last_step(&self) -> Option<&AgentStep> {
        self.steps.last()
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn count_actions(&self) -> usize {
        count_actions(&self.steps)
    }

    pub fn count_observations(&self) -> usize {
        count_observations(&self.steps)
    }

    pub fn as_messages(&self) -> Vec<Value> {
        steps_as_messages(&self.steps)
    }
}

pub(crate) fn count_actions(steps: &[AgentStep]) -> usize {
    steps
        .iter()
        .filter(|s| matches!(s, AgentStep::Action { .. }))
        .count()
}

pub(crate) fn count_observations(steps: &[AgentStep]) -> usize {
    steps
        .iter()
        .filter(|s| matches!(s, AgentStep::Observation { .. }))
        .count()
}

/// Convert steps to OpenAI message format, merging each run of consecutive
/// actions into one assistant message so its tool results follow it.
pub fn steps_as_messages(steps: &[AgentStep]) -> Vec<Value> {
    let mut messages: Vec<Value> = Vec::with_capacity(steps.len());
    let mut previous_was_action = false;

    for step in steps {
        let is_action = matches!(step, AgentStep::Action { .. });
        if is_action && previous_was_action {
            if let (Some(call), Some(calls)) = (
                step.to_openai_tool_call(),
                messages
                    .last_mut()
                    .and_then(|message| message.get_mut("tool_calls"))
                    .and_then(Value::as_array_mut),
            ) {
                calls.push(call);
                continue;
            }
        }
        messages.push(step.to_message());
        previous_was_action = is_action;
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(id: &str) -> AgentStep {
        AgentStep::Action {
            tool_name: "weather_forecast".to_string(),
            tool_call_id: id.to_string(),
            arguments: serde_json::json!({}),
        }
    }

    fn observation(id: &str) -> AgentStep {
        AgentStep::Observation {
            tool_call_id: id.to_string(),
            tool_name: "weather_forecast".to_string(),
            result: "ok".to_string(),
            is_error: false,
        }
    }

    #[test]
    fn test_add_steps() {
        let mut memory = WorkingMemory::new();
        assert!(memory.is_empty());
        memory.add_step(AgentStep::Task {
            content: "Test task".to_string(),
        });
        assert_eq!(memory.step_count(), 1);
    }

    #[test]
    fn test_parallel_actions_share_one_assistant_message() {
        let mut memory = WorkingMemory::new();
        memory.add_step(AgentStep::Task {
            content: "Weather in Goa and Paris?".to_string(),
        });
        memory.add_step(action("a"));
        memory.add_step(action("b"));
        memory.add_step(observation("a"));
        memory.add_step(observation("b"));

        let messages = memory.as_messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["tool_calls"].as_array().unwrap().len(), 2);
        assert_eq!(messages[2]["tool_call_id"], "a");
        assert_eq!(messages[3]["tool_call_id"], "b");
        assert_eq!(memory.count_actions(), 2);
        assert_eq!(memory.count_observations(), 2);
    }

    #[test]
    fn test_separate_rounds_stay_separate() {
        let messages = steps_as_messages(&[action("a"), observation("a"), action("b")]);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2]["tool_calls"][0]["id"], "b");
    }
}
