use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};

/// Represents a tool call request from the decision policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool to execute
    pub name: String,
    /// Arguments to pass to the tool
    pub arguments: Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Parse a tool call from OpenAI response format.
    ///
    /// Arguments that are not valid JSON are kept as a string so the
    /// registry can report the problem back to the model.
    pub fn from_openai_format(tool_call: &Value) -> Option<Self> {
        let id = tool_call.get("id")?.as_str()?.to_string();
        let function = tool_call.get("function")?;
        let name = function.get("name")?.as_str()?.to_string();
        if name.is_empty() {
            return None;
        }

        let arguments = match function.get("arguments") {
            Some(Value::String(raw)) if raw.trim().is_empty() => Value::Object(Default::default()),
            Some(Value::String(raw)) => {
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()))
            }
            Some(Value::Null) | None => Value::Object(Default::default()),
            Some(other) => other.clone(),
        };

        Some(Self {
            id,
            name,
            arguments,
        })
    }

    /// Get a human-readable description
    pub fn describe(&self) -> String {
        format!("{}({})", self.name, self.arguments)
    }
}

/// Represents the output from a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The tool call ID this output corresponds to
    pub tool_call_id: String,
    /// The tool name that was executed
    pub tool_name: String,
    /// The output/result from the tool
    pub output: Value,
    /// Whether the execution resulted in an error
    pub is_error: bool,
    /// Execution duration in milliseconds
    pub duration_ms: Option<u128>,
}

impl ToolOutput {
    /// Create a successful tool output
    pub fn success(tool_call_id: String, tool_name: String, output: Value) -> Self {
        Self {
            tool_call_id,
            tool_name,
            output,
            is_error: false,
            duration_ms: None,
        }
    }

    /// Create an error tool output from a structured error payload
    pub fn error(tool_call_id: String, tool_name: String, payload: Value) -> Self {
        Self {
            tool_call_id,
            tool_name,
            output: payload,
            is_error: true,
            duration_ms: None,
        }
    }

    /// Set the execution duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = Some(duration.as_millis());
        self
    }

    /// Get the output as a string for message content
    pub fn as_string(&self) -> String {
        match &self.output {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Tracks the execution of a tool call with timing information
#[derive(Debug)]
pub struct ToolExecution {
    pub tool_call: ToolCall,
    start_time: Instant,
}

impl ToolExecution {
    /// Start tracking a tool execution
    pub fn start(tool_call: ToolCall) -> Self {
        Self {
            tool_call,
            start_time: Instant::now(),
        }
    }

    pub fn succeed(self, output: Value) -> ToolOutput {
        let duration = self.start_time.elapsed();
        ToolOutput::success(self.tool_call.id, self.tool_call.name, output).with_duration(duration)
    }

    pub fn fail(self, payload: Value) -> ToolOutput {
        let duration = self.start_time.elapsed();
        ToolOutput::error(self.tool_call.id, self.tool_call.name, payload).with_duration(duration)
    }
}
