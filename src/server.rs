//! HTTP endpoint: `POST /chat` and `GET /health`.

use crate::core::{Assistant, ChatReply, DEFAULT_SESSION_ID};
use crate::{AgentError, Result};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Build the router. Turn failures are reported in the body with status 200.
pub fn router(assistant: Arc<Assistant>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .with_state(assistant)
}

async fn chat(
    State(assistant): State<Arc<Assistant>>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatReply> {
    let session_id = request
        .session_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_SESSION_ID);

    info!(
        target: "travel::server",
        session = session_id,
        chars = request.message.chars().count(),
        "chat request"
    );
    Json(assistant.chat(session_id, &request.message).await)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve(assistant: Arc<Assistant>, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AgentError::Config(format!("Failed to bind {}: {}", addr, e)))?;
    let local_addr = listener.local_addr()?;

    info!(target: "travel::server", %local_addr, "listening");
    axum::serve(listener, router(assistant)).await?;
    Ok(())
}
