use crate::schemas::ArgumentValidator;
use crate::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

/// Name, description and parameter schema the decision policy sees for a tool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolSpec {
    /// Render as an OpenAI function-calling tool definition
    pub fn to_openai_tool(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters
            }
        })
    }
}

/// A type-erased tool that can be executed by the orchestrator
pub trait Tool: Send + Sync + std::fmt::Debug {
    /// The name of the tool (used in function calls)
    fn name(&self) -> &'static str;

    /// A description of what the tool does
    fn description(&self) -> &'static str;

    /// JSON Schema for the tool's parameters
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with raw JSON parameters
    fn execute(
        &self,
        parameters: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + '_>>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A capability with a strongly-typed argument struct.
///
/// Registering a capability wraps it in a [`TypedTool`], which validates raw
/// arguments against the schema of `Args` before `invoke` is ever called.
#[async_trait]
pub trait Capability: Send + Sync + std::fmt::Debug + 'static {
    type Args: DeserializeOwned + JsonSchema + Send;

    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    async fn invoke(&self, args: Self::Args) -> Result<Value>;
}

#[derive(Debug)]
pub struct TypedTool<C: Capability> {
    capability: C,
    validator: ArgumentValidator,
}

impl<C: Capability> TypedTool<C> {
    pub fn new(capability: C) -> Result<Self> {
        Ok(Self {
            validator: ArgumentValidator::for_type::<C::Args>(C::NAME)?,
            capability,
        })
    }
}

impl<C: Capability> Tool for TypedTool<C> {
    fn name(&self) -> &'static str {
        C::NAME
    }

    fn description(&self) -> &'static str {
        C::DESCRIPTION
    }

    fn parameters_schema(&self) -> Value {
        self.validator.schema().clone()
    }

    fn execute(
        &self,
        parameters: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + '_>> {
        Box::pin(async move {
            let args: C::Args = self.validator.validate(parameters)?;
            self.capability.invoke(args).await
        })
    }
}
