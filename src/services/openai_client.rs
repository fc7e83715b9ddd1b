use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::error::{AgentError, Result};
use crate::knowledge::retriever::TextGenerator;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Minimal client for OpenAI-compatible chat completion and embedding endpoints.
#[derive(Clone, Debug)]
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.set_base_url(base_url);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn chat_completion(&self, body: &Value, timeout: Duration) -> Result<Value> {
        self.post_json(&endpoint_url(&self.base_url, "chat/completions"), body, timeout)
            .await
    }

    pub async fn embeddings(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = json!({ "model": model, "input": inputs });
        let response = self
            .post_json(&endpoint_url(&self.base_url, "embeddings"), &body, DEFAULT_TIMEOUT)
            .await?;

        let data = response
            .get("data")
            .and_then(|value| value.as_array())
            .ok_or_else(|| {
                AgentError::Unknown("Missing 'data' array in embeddings response".to_string())
            })?;

        data.iter()
            .map(|item| {
                item.get("embedding")
                    .and_then(|value| value.as_array())
                    .map(|values| {
                        values
                            .iter()
                            .filter_map(|v| v.as_f64())
                            .map(|v| v as f32)
                            .collect()
                    })
                    .ok_or_else(|| {
                        AgentError::Unknown("Embedding entry missing 'embedding'".to_string())
                    })
            })
            .collect()
    }

    async fn post_json(&self, url: &str, body: &Value, timeout: Duration) -> Result<Value> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AgentError::Config(format!("Failed to build HTTP client: {err}")))?;

        let response = client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", "travel-assistant")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let response_text = response.text().await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = headers
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(AgentError::RateLimit {
                retry_after: retry_after.max(1),
            });
        }

        let response_json: Value = serde_json::from_str(&response_text).map_err(|err| {
            AgentError::Http(format!("HTTP {status}: invalid JSON body: {err}"))
        })?;

        if !status.is_success() {
            let api_message = response_json
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(|value| value.as_str())
                .map(|s| s.to_string())
                .unwrap_or(response_text);

            return Err(AgentError::Http(format!(
                "HTTP {} error: {}",
                status, api_message
            )));
        }

        if let Some(error) = response_json.get("error") {
            let error_message = error
                .get("message")
                .and_then(|value| value.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| error.to_string());
            return Err(AgentError::Http(format!("API error: {}", error_message)));
        }

        Ok(response_json)
    }
}

fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with(endpoint) {
        trimmed.to_string()
    } else {
        format!("{}/{}", trimmed, endpoint)
    }
}

/// Pull the assistant message out of a chat completion response.
pub fn first_message(response: &Value) -> Result<&Value> {
    let choices = response
        .get("choices")
        .and_then(|value| value.as_array())
        .ok_or_else(|| {
            AgentError::Unknown("Missing 'choices' array in completion response".to_string())
        })?;

    let first_choice = choices.first().ok_or_else(|| {
        AgentError::Unknown("Completion response contained no choices".to_string())
    })?;

    first_choice.get("message").ok_or_else(|| {
        AgentError::Unknown("Completion response missing assistant message".to_string())
    })
}

#[derive(Clone, Debug)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Value>,
    tools: Vec<Value>,
    tool_choice: Option<Value>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Value>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            tool_choice: None,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: Value) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn into_value(self) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.messages,
        });

        if !self.tools.is_empty() {
            body["tools"] = Value::Array(self.tools);
        }

        if let Some(tool_choice) = self.tool_choice {
            body["tool_choice"] = tool_choice;
        }

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }

        body
    }
}

/// Single-prompt text generation over the chat completion endpoint
#[derive(Clone, Debug)]
pub struct ChatGenerator {
    client: OpenAIClient,
    model: String,
    timeout: Duration,
}

impl ChatGenerator {
    pub fn new(client: OpenAIClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl TextGenerator for ChatGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = ChatCompletionRequest::new(
            self.model.clone(),
            vec![json!({ "role": "user", "content": prompt })],
        )
        .with_temperature(0.2)
        .into_value();

        let response = self.client.chat_completion(&body, self.timeout).await?;
        let message = first_message(&response)?;
        message
            .get("content")
            .and_then(|value| value.as_str())
            .filter(|content| !content.trim().is_empty())
            .map(|content| content.to_string())
            .ok_or_else(|| {
                AgentError::RetrievalFailure("Completion returned no answer text".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            endpoint_url("https://openrouter.ai/api/v1/", "chat/completions"),
            "https://openrouter.ai/api/v1/chat/completions"
        );
        assert_eq!(
            endpoint_url("http://localhost/v1/embeddings", "embeddings"),
            "http://localhost/v1/embeddings"
        );
    }

    #[test]
    fn test_request_body() {
        let body = ChatCompletionRequest::new("m", vec![json!({"role": "user", "content": "hi"})])
            .with_tools(vec![json!({"type": "function"})])
            .with_tool_choice(json!("auto"))
            .with_temperature(0.2)
            .into_value();
        assert_eq!(body["model"], "m");
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["tools"].as_array().unwrap().len(), 1);
        assert!(body.get("max_tokens").is_none());
    }

    #[tokio::test]
    async fn test_generator_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Carry an umbrella."}}]}"#)
            .create_async()
            .await;

        let client = OpenAIClient::new("test-key".to_string()).with_base_url(server.url());
        let generator = ChatGenerator::new(client, "test-model");
        let text = generator.generate("Will it rain?").await.unwrap();

        assert_eq!(text, "Carry an umbrella.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generator_rejects_missing_content() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
            .create_async()
            .await;

        let client = OpenAIClient::new("test-key".to_string()).with_base_url(server.url());
        let err = ChatGenerator::new(client, "test-model")
            .generate("Is Goa crowded in December?")
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "RETRIEVAL_FAILURE");
    }

    #[tokio::test]
    async fn test_rate_limit_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(429)
            .with_header("retry-after", "7")
            .with_body("{}")
            .create_async()
            .await;

        let client = OpenAIClient::new("k".to_string()).with_base_url(server.url());
        let err = client.embeddings("e", &["x".to_string()]).await.unwrap_err();
        assert!(matches!(err, AgentError::RateLimit { retry_after: 7 }));
    }
}
