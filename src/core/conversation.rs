use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Default number of user/assistant exchanges kept per session
pub const DEFAULT_MAX_HISTORY_TURNS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message of a finished exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }

    pub fn to_message(&self) -> Value {
        json!({
            "role": self.role,
            "content": self.text
        })
    }
}

/// Bounded history of a single session. Only completed exchanges are stored;
/// when the bound is exceeded the oldest exchange is dropped first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    turns: Vec<Turn>,
    max_exchanges: usize,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY_TURNS)
    }
}

impl ConversationState {
    pub fn new(max_exchanges: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_exchanges,
        }
    }

    pub fn record_exchange(&mut self, query: impl Into<String>, reply: impl Into<String>) {
        self.turns.push(Turn::user(query));
        self.turns.push(Turn::assistant(reply));

        let limit = self.max_exchanges * 2;
        if self.turns.len() > limit {
            let excess = self.turns.len() - limit;
            self.turns.drain(..excess);
        }
    }

    pub fn history(&self) -> &[Turn] {
        &self.turns
    }

    pub fn exchange_count(&self) -> usize {
        self.turns.len() / 2
    }

    pub fn max_exchanges(&self) -> usize {
        self.max_exchanges
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn as_messages(&self) -> Vec<Value> {
        self.turns.iter().map(Turn::to_message).collect()
    }
}
