use super::embeddings::EmbeddingProvider;
use super::index::VectorStore;
use crate::error::{AgentError, Result};
use async_trait::async_trait;
use std::fmt::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Number of passages placed in the grounded prompt
pub const DEFAULT_TOP_K: usize = 3;

/// Plain text completion, used to phrase the grounded answer
#[async_trait]
pub trait TextGenerator: Send + Sync + std::fmt::Debug {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Process-lifetime handle to the document index. The first caller opens or
/// builds it; concurrent callers wait for that single initialization.
#[derive(Debug)]
pub struct SharedIndex {
    cell: OnceCell<Arc<VectorStore>>,
    index_path: PathBuf,
    docs_dir: PathBuf,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl SharedIndex {
    pub fn new(
        index_path: impl Into<PathBuf>,
        docs_dir: impl Into<PathBuf>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            cell: OnceCell::new(),
            index_path: index_path.into(),
            docs_dir: docs_dir.into(),
            embedder,
        }
    }

    pub async fn get(&self) -> Result<Arc<VectorStore>> {
        let store = self
            .cell
            .get_or_try_init(|| async {
                info!(
                    target: "travel::knowledge",
                    index = %self.index_path.display(),
                    docs = %self.docs_dir.display(),
                    "initializing document index"
                );
                VectorStore::open_or_build(&self.index_path, &self.docs_dir, self.embedder.as_ref())
                    .await
                    .map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(store))
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }
}

/// Answers free-text questions grounded in the document index.
#[derive(Debug, Clone)]
pub struct KnowledgeRetriever {
    index: Arc<SharedIndex>,
    generator: Arc<dyn TextGenerator>,
    top_k: usize,
}

impl KnowledgeRetriever {
    pub fn new(index: Arc<SharedIndex>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            index,
            generator,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub async fn answer(&self, question: &str) -> Result<String> {
        let store = self.index.get().await.map_err(into_retrieval_failure)?;
        let query = self
            .index
            .embedder()
            .embed(question)
            .await
            .map_err(into_retrieval_failure)?;

        let passages: Vec<&str> = store
            .search(&query, self.top_k)
            .into_iter()
            .map(|(passage, score)| {
                debug!(
                    target: "travel::knowledge",
                    source = %passage.source,
                    position = passage.position,
                    score,
                    "retrieved passage"
                );
                passage.text.as_str()
            })
            .collect();

        let prompt = grounded_prompt(&passages, question);
        let answer = self
            .generator
            .generate(&prompt)
            .await
            .map_err(into_retrieval_failure)?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(AgentError::RetrievalFailure(
                "Generator produced an empty answer".to_string(),
            ));
        }
        Ok(answer.to_string())
    }
}

fn into_retrieval_failure(err: AgentError) -> AgentError {
    match err {
        AgentError::RetrievalFailure(_) => err,
        other => AgentError::RetrievalFailure(other.to_string()),
    }
}

/// Prompt that grounds the answer in `passages` without revealing that it does.
pub fn grounded_prompt(passages: &[&str], question: &str) -> String {
    let mut prompt = String::from(
        "You are a tourism assistant answering questions about travel and about Nublo's privacy policy.\n\
         Base your answer on the context below. When the context does not cover the question, answer from your own knowledge.\n\
         Never say whether or how the context was used.\n\nContext:\n",
    );
    for passage in passages {
        let _ = writeln!(prompt, "{}\n", passage);
    }
    let _ = write!(prompt, "Question: {}\nAnswer:", question);
    prompt
}
