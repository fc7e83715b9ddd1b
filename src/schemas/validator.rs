use crate::{AgentError, Result};
use jsonschema::{Draft, JSONSchema};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

const MAX_SCHEMA_ERRORS: usize = 3;

/// Validates raw tool arguments against a compiled schema, then deserializes
/// them into the tool's argument type.
pub struct ArgumentValidator {
    tool_name: &'static str,
    schema: Value,
    compiled: JSONSchema,
}

impl fmt::Debug for ArgumentValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentValidator")
            .field("tool_name", &self.tool_name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl ArgumentValidator {
    /// Build a validator from the schema of `T`.
    pub fn for_type<T: JsonSchema>(tool_name: &'static str) -> Result<Self> {
        let schema = super::argument_schema::<T>()?;
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema)
            .map_err(|err| {
                AgentError::Validation(format!(
                    "Failed to prepare `{}` argument schema: {}",
                    tool_name, err
                ))
            })?;

        Ok(Self {
            tool_name,
            schema,
            compiled,
        })
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Check `params` against the schema and deserialize them into `T`.
    pub fn validate<T: DeserializeOwned>(&self, params: Value) -> Result<T> {
        self.check_schema(&params)?;

        serde_path_to_error::deserialize(params).map_err(|e| {
            let path = e.path().to_string();
            AgentError::Validation(format!(
                "Invalid arguments for `{}` at {}: {}",
                self.tool_name,
                if path.is_empty() || path == "." { "<root>".to_string() } else { path },
                e.inner()
            ))
        })
    }

    fn check_schema(&self, params: &Value) -> Result<()> {
        let Err(errors) = self.compiled.validate(params) else {
            return Ok(());
        };

        let mut details = Vec::new();
        let mut truncated = false;
        for (idx, error) in errors.enumerate() {
            if idx == MAX_SCHEMA_ERRORS {
                truncated = true;
                break;
            }
            let mut path = error.instance_path.to_string();
            if path.is_empty() {
                path = "<root>".to_string();
            }
            details.push(format!("{}: {}", path, error));
        }

        let mut detail_str = details.join("; ");
        if truncated {
            detail_str.push_str("; additional errors truncated");
        }

        Err(AgentError::Validation(format!(
            "Arguments for `{}` do not match its schema: {}",
            self.tool_name, detail_str
        )))
    }
}
