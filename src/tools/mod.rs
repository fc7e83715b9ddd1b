//! Capability registry and the built-in travel tools

pub mod budget;
pub mod knowledge;
pub mod registry;
pub mod tool;
pub mod weather;

pub use budget::{BudgetArgs, BudgetTool};
pub use knowledge::{KnowledgeArgs, KnowledgeTool};
pub use registry::CapabilityRegistry;
pub use tool::{Capability, Tool, ToolSpec, TypedTool};
pub use weather::{WeatherArgs, WeatherTool};
