use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single step of one conversational turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStep {
    /// The user's query for this turn
    Task { content: String },
    /// The decision policy asked for a tool
    Action {
        tool_name: String,
        tool_call_id: String,
        arguments: Value,
    },
    /// Result of a tool execution, fed back to the policy
    Observation {
        tool_call_id: String,
        tool_name: String,
        result: String,
        is_error: bool,
    },
    /// Final natural-language reply
    Reply { answer: String },
}

impl AgentStep {
    /// Convert step to OpenAI message format.
    ///
    /// Consecutive actions must be merged into a single assistant message;
    /// [`WorkingMemory::as_messages`](super::memory::WorkingMemory::as_messages) does that.
    pub fn to_message(&self) -> Value {
        match self {
            AgentStep::Task { content } => {
                serde_json::json!({
                    "role": "user",
                    "content": content
                })
            }
            AgentStep::Action { .. } => {
                serde_json::json!({
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [self.to_openai_tool_call()]
                })
            }
            AgentStep::Observation {
                tool_call_id,
                result,
                ..
            } => {
                serde_json::json!({
                    "role": "tool",
                    "tool_call_id": tool_call_id,
                    "content": result
                })
            }
            AgentStep::Reply { answer } => {
                serde_json::json!({
                    "role": "assistant",
                    "content": answer
                })
            }
        }
    }

    /// The `tool_calls` entry for an action; `None` for other steps
    pub fn to_openai_tool_call(&self) -> Option<Value> {
        match self {
            AgentStep::Action {
                tool_name,
                tool_call_id,
                arguments,
            } => {
                let arguments = match arguments {
                    Value::String(raw) => raw.clone(),
                    other => other.to_string(),
                };
                Some(serde_json::json!({
                    "id": tool_call_id,
                    "type": "function",
                    "function": {
                        "name": tool_name,
                        "arguments": arguments
                    }
                }))
            }
            _ => None,
        }
    }

    /// Get a human-readable description of the step
    pub fn describe(&self) -> String {
        match self {
            AgentStep::Task { content } => format!("🧭 Task: {}", content),
            AgentStep::Action {
                tool_name,
                arguments,
                ..
            } => {
                format!("🔧 Action: {}({})", tool_name, arguments)
            }
            AgentStep::Observation {
                tool_name,
                result,
                is_error,
                ..
            } => {
                if *is_error {
                    format!("❌ Error from {}: {}", tool_name, result)
                } else {
                    format!("👁 Observation from {}: {}", tool_name, result)
                }
            }
            AgentStep::Reply { answer } => format!("✅ Reply: {}", answer),
        }
    }
}
