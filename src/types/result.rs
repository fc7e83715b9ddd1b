use crate::core::memory::{count_actions, count_observations};
use crate::core::steps::AgentStep;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of one handled user turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResult {
    /// Final reply shown to the user
    pub reply: String,
    /// All steps taken during the turn
    pub steps: Vec<AgentStep>,
    /// Number of policy decisions made
    pub iterations: usize,
    /// Total execution duration
    pub duration: Duration,
}

impl TurnResult {
    pub fn new(reply: String, steps: Vec<AgentStep>, iterations: usize, duration: Duration) -> Self {
        Self {
            reply,
            steps,
            iterations,
            duration,
        }
    }

    /// Generate a human-readable replay of the turn
    pub fn replay(&self) -> String {
        let mut lines = Vec::new();

        lines.push("=== Turn Trace ===".to_string());
        lines.push(format!("Duration: {:.2}s", self.duration.as_secs_f64()));
        lines.push(format!("Iterations: {}", self.iterations));

        lines.push(String::new());
        lines.push("--- Steps ---".to_string());

        for (idx, step) in self.steps.iter().enumerate() {
            lines.push(format!("{}. {}", idx + 1, step.describe()));
        }

        lines.push(String::new());
        lines.push("--- Reply ---".to_string());
        lines.push(self.reply.clone());

        lines.join("\n")
    }

    /// Get count of actions (tool calls) executed
    pub fn action_count(&self) -> usize {
        count_actions(&self.steps)
    }

    /// Get count of observations (tool results)
    pub fn observation_count(&self) -> usize {
        count_observations(&self.steps)
    }

    /// Names of the tools called, in call order
    pub fn tools_called(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                AgentStep::Action { tool_name, .. } => Some(tool_name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Get all error observations
    pub fn errors(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                AgentStep::Observation {
                    result, is_error, ..
                } if *is_error => Some(result.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> TurnResult {
        let steps = vec![
            AgentStep::Task {
                content: "Weather in Goa tomorrow?".to_string(),
            },
            AgentStep::Action {
                tool_name: "weather_forecast".to_string(),
                tool_call_id: "1".to_string(),
                arguments: json!({"city": "Goa", "date": "tomorrow"}),
            },
            AgentStep::Observation {
                tool_call_id: "1".to_string(),
                tool_name: "weather_forecast".to_string(),
                result: "{\"error\":{\"message\":\"Couldn't find city: Goa\"}}".to_string(),
                is_error: true,
            },
            AgentStep::Reply {
                answer: "I couldn't find that city.".to_string(),
            },
        ];
        TurnResult::new(
            "I couldn't find that city.".to_string(),
            steps,
            2,
            Duration::from_secs(2),
        )
    }

    #[test]
    fn test_counts() {
        let result = sample();
        assert_eq!(result.action_count(), 1);
        assert_eq!(result.observation_count(), 1);
        assert_eq!(result.tools_called(), vec!["weather_forecast"]);
        assert_eq!(result.errors().len(), 1);
    }

    #[test]
    fn test_replay_format() {
        let replay = sample().replay();
        assert!(replay.contains("Duration: 2.00s"));
        assert!(replay.contains("Iterations: 2"));
        assert!(replay.contains("1. 🧭 Task"));
        assert!(replay.ends_with("I couldn't find that city."));
    }
}
