use super::openai_client::{first_message, ChatCompletionRequest, OpenAIClient};
use crate::core::policy::{Decision, DecisionPolicy, PolicyRequest};
use crate::core::tool_call::ToolCall;
use crate::{AgentError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_MODEL: &str = "openai/gpt-4.1-mini";

/// Decision policy backed by an OpenAI-compatible chat completion API
#[derive(Debug, Clone)]
pub struct ChatCompletionPolicy {
    client: OpenAIClient,
    model: String,
    max_tokens: Option<u32>,
    temperature: f32,
    timeout: Duration,
}

impl ChatCompletionPolicy {
    pub fn new(client: OpenAIClient) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: Some(1500),
            temperature: 0.2,
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl DecisionPolicy for ChatCompletionPolicy {
    async fn decide(&self, request: PolicyRequest<'_>) -> Result<Decision> {
        let tools: Vec<Value> = request.tools.iter().map(|tool| tool.to_openai_tool()).collect();

        let mut chat_request = ChatCompletionRequest::new(self.model.clone(), request.to_messages())
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);
        if !tools.is_empty() {
            chat_request = chat_request
                .with_tools(tools)
                .with_tool_choice(json!("auto"));
        }

        let response = self
            .client
            .chat_completion(&chat_request.into_value(), self.timeout)
            .await?;
        let decision = parse_decision(first_message(&response)?)?;
        debug!(target: "travel::orchestrator", model = %self.model, ?decision, "policy decided");
        Ok(decision)
    }
}

/// Interpret an assistant message: any tool calls win over text content.
pub fn parse_decision(message: &Value) -> Result<Decision> {
    if let Some(calls) = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .filter(|calls| !calls.is_empty())
    {
        return calls
            .iter()
            .map(|call| {
                ToolCall::from_openai_format(call).ok_or_else(|| {
                    AgentError::InvalidFunctionCall(format!("Malformed tool call: {}", call))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Decision::ToolCalls);
    }

    match message.get("content").and_then(Value::as_str) {
        Some(content) if !content.trim().is_empty() => Ok(Decision::Reply(content.to_string())),
        _ => Err(AgentError::InvalidFunctionCall(
            "Assistant message contained neither content nor tool calls".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversation::Turn;
    use crate::core::steps::AgentStep;
    use crate::tools::ToolSpec;

    #[test]
    fn test_parse_reply() {
        let decision = parse_decision(&json!({"role": "assistant", "content": "Hello!"})).unwrap();
        assert_eq!(decision, Decision::Reply("Hello!".to_string()));
    }

    #[test]
    fn test_parse_tool_calls() {
        let message = json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [
                {"id": "a", "type": "function", "function": {"name": "estimate_budget", "arguments": "{\"destination\":\"Goa\"}"}},
                {"id": "b", "type": "function", "function": {"name": "weather_forecast", "arguments": "{\"city\":\"Goa\",\"date\":\"July\"}"}}
            ]
        });
        let Decision::ToolCalls(calls) = parse_decision(&message).unwrap() else {
            panic!("expected tool calls");
        };
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].name, "weather_forecast");
    }

    #[test]
    fn test_parse_empty_message_fails() {
        let err = parse_decision(&json!({"role": "assistant", "content": ""})).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_FUNCTION_CALL");
    }

    #[tokio::test]
    async fn test_decide_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(mockito::Matcher::PartialJson(json!({
                "model": "test-model",
                "tool_choice": "auto"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices":[{"message":{"role":"assistant","content":null,"tool_calls":[{"id":"call_1","type":"function","function":{"name":"weather_forecast","arguments":"{\"city\":\"Manali\",\"date\":\"tomorrow\"}"}}]}}]}"#,
            )
            .create_async()
            .await;

        let client = OpenAIClient::new("key".to_string()).with_base_url(server.url());
        let policy = ChatCompletionPolicy::new(client).with_model("test-model");
        let tools = vec![ToolSpec {
            name: "weather_forecast".to_string(),
            description: "Weather".to_string(),
            parameters: json!({"type": "object"}),
        }];
        let history = vec![Turn::user("Hi"), Turn::assistant("Hello")];
        let working = vec![AgentStep::Task {
            content: "Weather in Manali tomorrow?".to_string(),
        }];

        let decision = policy
            .decide(PolicyRequest {
                instructions: "Be helpful.",
                tools: &tools,
                history: &history,
                working: &working,
            })
            .await
            .unwrap();

        assert_eq!(
            decision,
            Decision::ToolCalls(vec![ToolCall::new(
                "call_1",
                "weather_forecast",
                json!({"city": "Manali", "date": "tomorrow"})
            )])
        );
        mock.assert_async().await;
    }
}
