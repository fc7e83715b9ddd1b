use thiserror::Error;

/// Failures while turning a place and a date expression into weather data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Couldn't find city: {0}")]
    PlaceNotFound(String),

    #[error("Couldn't understand date: {0}")]
    DateUnparseable(String),

    #[error("No forecast for {place} on {date}")]
    NoForecastAvailable { place: String, date: String },

    #[error("OpenWeather API key missing.")]
    MissingCredentials,

    #[error("Weather provider error: {0}")]
    Provider(String),
}

/// Main error type for the assistant
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid function call: {0}")]
    InvalidFunctionCall(String),

    #[error("Tool `{tool}` timed out after {seconds}s")]
    ToolTimeout { tool: String, seconds: u64 },

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Maximum iterations exceeded: {0}")]
    MaxIterations(usize),

    #[error("Rate limit exceeded: retry after {retry_after}s")]
    RateLimit { retry_after: u64 },

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("Retrieval failure: {0}")]
    RetrievalFailure(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AgentError>;

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AgentError::Timeout(err.to_string())
        } else {
            AgentError::Http(err.to_string())
        }
    }
}

impl AgentError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AgentError::Http(_)
                | AgentError::Validation(_)
                | AgentError::RateLimit { .. }
                | AgentError::Timeout(_)
                | AgentError::ToolTimeout { .. }
        )
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AgentError::Config(_) => "CONFIG_ERROR",
            AgentError::Serialization(_) => "SERIALIZATION_ERROR",
            AgentError::Http(_) => "HTTP_ERROR",
            AgentError::Io(_) => "IO_ERROR",
            AgentError::Validation(_) => "VALIDATION_ERROR",
            AgentError::ToolExecution(_) => "TOOL_EXECUTION_ERROR",
            AgentError::ToolNotFound(_) => "TOOL_NOT_FOUND",
            AgentError::InvalidFunctionCall(_) => "INVALID_FUNCTION_CALL",
            AgentError::ToolTimeout { .. } => "TOOL_TIMEOUT",
            AgentError::Timeout(_) => "TIMEOUT_ERROR",
            AgentError::MaxIterations(_) => "MAX_ITERATIONS_EXCEEDED",
            AgentError::RateLimit { .. } => "RATE_LIMIT_ERROR",
            AgentError::Resolution(inner) => match inner {
                ResolutionError::PlaceNotFound(_) => "PLACE_NOT_FOUND",
                ResolutionError::DateUnparseable(_) => "DATE_UNPARSEABLE",
                ResolutionError::NoForecastAvailable { .. }
                | ResolutionError::MissingCredentials => "NO_FORECAST_AVAILABLE",
                ResolutionError::Provider(_) => "TOOL_EXECUTION_ERROR",
            },
            AgentError::RetrievalFailure(_) => "RETRIEVAL_FAILURE",
            AgentError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    /// Convert to a structured error payload
    pub fn to_error_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "retryable": self.is_retryable()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_codes() {
        let err: AgentError = ResolutionError::MissingCredentials.into();
        assert_eq!(err.error_code(), "NO_FORECAST_AVAILABLE");
        assert_eq!(err.to_string(), "OpenWeather API key missing.");

        let err: AgentError = ResolutionError::DateUnparseable("someday".into()).into();
        assert_eq!(err.error_code(), "DATE_UNPARSEABLE");
        assert!(err.to_string().contains("someday"));
    }

    #[test]
    fn test_tool_timeout_payload() {
        let err = AgentError::ToolTimeout {
            tool: "weather_forecast".to_string(),
            seconds: 30,
        };
        let payload = err.to_error_payload();
        assert_eq!(payload["error"]["code"], "TOOL_TIMEOUT");
        assert_eq!(payload["error"]["retryable"], true);
    }
}
