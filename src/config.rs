//! Environment-driven configuration and wiring of the assistant.

use crate::core::{Assistant, Orchestrator, SessionStore};
use crate::knowledge::{
    EmbeddingProvider, KnowledgeRetriever, RemoteEmbedder, SharedIndex, TrigramEmbedder,
};
use crate::services::chat_policy::{ChatCompletionPolicy, DEFAULT_MODEL};
use crate::services::openai_client::{ChatGenerator, OpenAIClient, DEFAULT_BASE_URL};
use crate::tools::{BudgetTool, CapabilityRegistry, KnowledgeTool, WeatherTool};
use crate::weather::{NominatimGeocoder, OpenMeteoClimate, OpenWeatherForecast, WeatherResolver};
use crate::{AgentError, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_EMBEDDING_MODEL: &str = "openai/text-embedding-3-small";
const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;
const DEFAULT_TRIGRAM_DIMENSIONS: usize = 384;

/// Which embedding provider backs the document index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingBackend {
    #[default]
    Trigram,
    Remote,
}

impl FromStr for EmbeddingBackend {
    type Err = AgentError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "trigram" | "local" => Ok(EmbeddingBackend::Trigram),
            "remote" | "openai" => Ok(EmbeddingBackend::Remote),
            other => Err(AgentError::Config(format!(
                "Unknown embedding backend `{}` (expected `trigram` or `remote`)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub openweather_api_key: Option<String>,
    pub data_dir: PathBuf,
    pub index_path: PathBuf,
    pub embeddings: EmbeddingBackend,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub max_iterations: usize,
    pub tool_timeout: Duration,
    pub policy_timeout: Duration,
    pub history_turns: usize,
    pub session_idle_timeout: Duration,
    pub max_sessions: usize,
    pub bind: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            openweather_api_key: None,
            data_dir: PathBuf::from("data"),
            index_path: PathBuf::from("db/index.json"),
            embeddings: EmbeddingBackend::Trigram,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            max_iterations: crate::core::orchestrator::DEFAULT_MAX_ITERATIONS,
            tool_timeout: crate::core::orchestrator::DEFAULT_TOOL_TIMEOUT,
            policy_timeout: crate::core::orchestrator::DEFAULT_POLICY_TIMEOUT,
            history_turns: crate::core::conversation::DEFAULT_MAX_HISTORY_TURNS,
            session_idle_timeout: crate::core::session::DEFAULT_SESSION_IDLE_TIMEOUT,
            max_sessions: crate::core::session::DEFAULT_MAX_SESSIONS,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_string(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|err| AgentError::Config(format!("Invalid value for {}: {}", name, err))),
        None => Ok(default),
    }
}

impl AppConfig {
    /// Load from the process environment. Call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            api_key: env_string("OPENAI_API_KEY"),
            base_url: env_string("OPENAI_BASE_URL")
                .or_else(|| env_string("OPENROUTER_BASE_URL"))
                .unwrap_or(defaults.base_url),
            model: env_string("TRAVEL_MODEL").unwrap_or(defaults.model),
            openweather_api_key: env_string("OPENWEATHER_API_KEY"),
            data_dir: env_string("TRAVEL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            index_path: env_string("TRAVEL_INDEX_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.index_path),
            embeddings: env_parse("TRAVEL_EMBEDDINGS", defaults.embeddings)?,
            embedding_model: env_string("TRAVEL_EMBEDDING_MODEL")
                .unwrap_or(defaults.embedding_model),
            embedding_dimensions: env_parse(
                "TRAVEL_EMBEDDING_DIMENSIONS",
                defaults.embedding_dimensions,
            )?,
            max_iterations: env_parse("TRAVEL_MAX_ITERATIONS", defaults.max_iterations)?,
            tool_timeout: Duration::from_secs(env_parse(
                "TRAVEL_TOOL_TIMEOUT_SECS",
                defaults.tool_timeout.as_secs(),
            )?),
            policy_timeout: Duration::from_secs(env_parse(
                "TRAVEL_POLICY_TIMEOUT_SECS",
                defaults.policy_timeout.as_secs(),
            )?),
            history_turns: env_parse("TRAVEL_HISTORY_TURNS", defaults.history_turns)?,
            session_idle_timeout: Duration::from_secs(env_parse(
                "TRAVEL_SESSION_IDLE_SECS",
                defaults.session_idle_timeout.as_secs(),
            )?),
            max_sessions: env_parse("TRAVEL_MAX_SESSIONS", defaults.max_sessions)?,
            bind: env_string("TRAVEL_BIND").unwrap_or(defaults.bind),
        })
    }

    fn client(&self) -> Result<OpenAIClient> {
        let api_key = self.api_key.clone().ok_or_else(|| {
            AgentError::Config(
                "OPENAI_API_KEY environment variable must be set before starting the assistant"
                    .to_string(),
            )
        })?;
        Ok(OpenAIClient::new(api_key).with_base_url(self.base_url.clone()))
    }

    /// Weather resolver over the public providers; needs no language model
    pub fn weather_resolver(&self) -> Result<WeatherResolver> {
        Ok(WeatherResolver::new(
            Arc::new(NominatimGeocoder::new()?),
            Arc::new(OpenWeatherForecast::new(self.openweather_api_key.clone())?),
            Arc::new(OpenMeteoClimate::new()?),
        ))
    }

    pub fn embedder(&self) -> Result<Arc<dyn EmbeddingProvider>> {
        Ok(match self.embeddings {
            EmbeddingBackend::Trigram => Arc::new(TrigramEmbedder::new(DEFAULT_TRIGRAM_DIMENSIONS)),
            EmbeddingBackend::Remote => Arc::new(RemoteEmbedder::new(
                self.client()?,
                self.embedding_model.clone(),
                self.embedding_dimensions,
            )),
        })
    }

    /// Registry with the budget, weather and knowledge tools
    pub fn registry(&self) -> Result<CapabilityRegistry> {
        let client = self.client()?;
        let index = Arc::new(SharedIndex::new(
            self.index_path.clone(),
            self.data_dir.clone(),
            self.embedder()?,
        ));
        let generator = ChatGenerator::new(client, self.model.clone()).with_timeout(self.tool_timeout);

        let mut registry = CapabilityRegistry::new();
        registry.register(BudgetTool::new())?;
        registry.register(WeatherTool::new(self.weather_resolver()?))?;
        registry.register(KnowledgeTool::new(KnowledgeRetriever::new(
            index,
            Arc::new(generator),
        )))?;
        Ok(registry)
    }

    pub fn build_assistant(&self) -> Result<Assistant> {
        let policy = ChatCompletionPolicy::new(self.client()?)
            .with_model(self.model.clone())
            .with_timeout(self.policy_timeout);

        let orchestrator = Orchestrator::new(Arc::new(policy), Arc::new(self.registry()?))
            .with_max_iterations(self.max_iterations)
            .with_tool_timeout(self.tool_timeout)
            .with_policy_timeout(self.policy_timeout);

        Ok(Assistant::new(orchestrator, self.session_store()))
    }

    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(self.history_turns)
            .with_idle_timeout(self.session_idle_timeout)
            .with_max_sessions(self.max_sessions)
    }
}
