pub mod chat_policy;
pub mod openai_client;
pub mod prompts;

pub use chat_policy::{parse_decision, ChatCompletionPolicy};
pub use openai_client::{ChatGenerator, OpenAIClient};
