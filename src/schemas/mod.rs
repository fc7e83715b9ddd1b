//! JSON Schema generation and validation for typed tool arguments

pub mod validator;

use crate::error::{AgentError, Result};
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde_json::Value;

/// Generate a self-contained parameter schema for `T`, suitable for function calling.
pub fn argument_schema<T: JsonSchema>() -> Result<Value> {
    let settings = SchemaSettings::draft07().with(|settings| {
        settings.inline_subschemas = true;
    });
    let root = settings.into_generator().into_root_schema_for::<T>();

    let mut schema = serde_json::to_value(root).map_err(|err| {
        AgentError::Validation(format!(
            "failed to serialize schema for {}: {}",
            std::any::type_name::<T>(),
            err
        ))
    })?;

    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
        object.remove("definitions");
    }
    Ok(schema)
}

pub use validator::ArgumentValidator;
