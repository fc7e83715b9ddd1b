use super::tool::{Capability, Tool, ToolSpec, TypedTool};
use crate::{AgentError, Result};
use serde_json::Value;
use tracing::debug;

/// The set of tools the decision policy may call, in registration order
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl CapabilityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed capability; its argument schema is compiled here, once.
    pub fn register<C: Capability>(&mut self, capability: C) -> Result<()> {
        self.register_tool(TypedTool::new(capability)?)
    }

    /// Register an already type-erased tool
    pub fn register_tool<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        if self.has_tool(tool.name()) {
            return Err(AgentError::Config(format!(
                "Tool `{}` is already registered",
                tool.name()
            )));
        }
        self.tools.push(Box::new(tool));
        Ok(())
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|tool| tool.name() == name)
            .map(|tool| tool.as_ref())
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|tool| tool.spec()).collect()
    }

    /// Generate tool schemas for OpenAI function calling
    pub fn to_openai_tools(&self) -> Vec<Value> {
        self.specs().iter().map(ToolSpec::to_openai_tool).collect()
    }

    /// Validate `parameters` for the named tool and execute it
    pub async fn execute(&self, name: &str, parameters: Value) -> Result<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;

        debug!(target: "travel::registry", tool = name, %parameters, "executing tool");
        tool.execute(parameters).await
    }
}
