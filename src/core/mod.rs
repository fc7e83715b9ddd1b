pub mod assistant;
pub mod conversation;
pub mod memory;
pub mod orchestrator;
pub mod policy;
pub mod session;
pub mod steps;
pub mod tool_call;

pub use crate::types::result::TurnResult;
pub use assistant::{Assistant, ChatReply, APOLOGY, DEFAULT_SESSION_ID};
pub use conversation::{ConversationState, Role, Turn};
pub use memory::WorkingMemory;
pub use orchestrator::Orchestrator;
pub use policy::{Decision, DecisionPolicy, PolicyRequest};
pub use session::{SessionHandle, SessionStore};
pub use steps::AgentStep;
pub use tool_call::{ToolCall, ToolExecution, ToolOutput};
