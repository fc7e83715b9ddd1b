use super::orchestrator::Orchestrator;
use super::session::SessionStore;
use crate::types::result::TurnResult;
use crate::{AgentError, Result};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Reply shown to the user whenever a turn fails
pub const APOLOGY: &str = "Sorry, something went wrong.";

pub const DEFAULT_SESSION_ID: &str = "default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatReply {
    pub fn success(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            error: None,
        }
    }

    pub fn failure(err: &AgentError) -> Self {
        Self {
            response: APOLOGY.to_string(),
            error: Some(err.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Session-aware front door over the orchestrator
#[derive(Debug)]
pub struct Assistant {
    orchestrator: Orchestrator,
    sessions: SessionStore,
}

impl Assistant {
    pub fn new(orchestrator: Orchestrator, sessions: SessionStore) -> Self {
        Self {
            orchestrator,
            sessions,
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Run a turn and return the full result, including its steps
    pub async fn run(&self, session_id: &str, message: &str) -> Result<TurnResult> {
        let session = self.sessions.session(session_id).await;
        let mut state = session.lock().await;
        self.orchestrator.handle(&mut state, message).await
    }

    /// Run a turn; failures become the apology plus the error text
    pub async fn chat(&self, session_id: &str, message: &str) -> ChatReply {
        match self.run(session_id, message).await {
            Ok(result) => {
                info!(
                    target: "travel::orchestrator",
                    session = session_id,
                    tools = ?result.tools_called(),
                    "reply ready"
                );
                ChatReply::success(result.reply)
            }
            Err(err) => {
                error!(
                    target: "travel::orchestrator",
                    session = session_id,
                    code = err.error_code(),
                    error = %err,
                    "turn failed"
                );
                ChatReply::failure(&err)
            }
        }
    }
}
