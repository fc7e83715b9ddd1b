//! travel-assistant: a conversational travel assistant that routes each
//! query to a trip-budget estimator, a weather resolver and a tourism
//! knowledge retriever through a tool-calling decision policy.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use travel_assistant::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     dotenvy::dotenv().ok();
//!     let assistant = AppConfig::from_env()?.build_assistant()?;
//!
//!     let reply = assistant
//!         .chat("default", "Plan a 3-day budget trip to Goa for 2 people")
//!         .await;
//!     println!("{}", reply.response);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod knowledge;
pub mod schemas;
pub mod server;
pub mod services;
pub mod tools;
pub mod travel;
pub mod types;
pub mod weather;

pub use crate::core::{
    AgentStep, Assistant, ChatReply, ConversationState, Decision, DecisionPolicy, Orchestrator,
    PolicyRequest, SessionStore, ToolCall, ToolOutput, TurnResult, APOLOGY, DEFAULT_SESSION_ID,
};
pub use error::{AgentError, ResolutionError, Result};
pub use schemas::ArgumentValidator;
pub use tools::{Capability, CapabilityRegistry, Tool, ToolSpec};

#[cfg(feature = "cli")]
pub mod cli;
