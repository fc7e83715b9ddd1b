use super::conversation::Turn;
use super::memory::steps_as_messages;
use super::steps::AgentStep;
use super::tool_call::ToolCall;
use crate::tools::ToolSpec;
use crate::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Everything a policy sees when deciding the next move of a turn
#[derive(Debug, Clone, Copy)]
pub struct PolicyRequest<'a> {
    pub instructions: &'a str,
    pub tools: &'a [ToolSpec],
    /// Completed exchanges of this session, oldest first
    pub history: &'a [Turn],
    /// Steps of the current turn, starting with the user's query
    pub working: &'a [AgentStep],
}

impl PolicyRequest<'_> {
    /// System prompt, prior exchanges, then the current turn's working steps
    pub fn to_messages(&self) -> Vec<Value> {
        let mut messages = Vec::with_capacity(1 + self.history.len() + self.working.len());
        messages.push(json!({
            "role": "system",
            "content": self.instructions
        }));
        messages.extend(self.history.iter().map(Turn::to_message));
        messages.extend(steps_as_messages(self.working));
        messages
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    ToolCalls(Vec<ToolCall>),
    Reply(String),
}

/// Chooses, at each step of a turn, between calling tools and replying.
#[async_trait]
pub trait DecisionPolicy: Send + Sync + std::fmt::Debug {
    async fn decide(&self, request: PolicyRequest<'_>) -> Result<Decision>;
}
