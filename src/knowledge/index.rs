//! Persisted vector index over document passages.

use super::chunker::{chunk_text, Passage, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use super::embeddings::{cosine_similarity, EmbeddingProvider};
use crate::error::{AgentError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

const DOCUMENT_EXTENSIONS: &[&str] = &["txt", "md"];
const EMBED_BATCH_SIZE: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedPassage {
    pub passage: Passage,
    pub embedding: Vec<f32>,
}

/// In-memory cosine-similarity store, persisted as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStore {
    embedder: String,
    dimensions: usize,
    entries: Vec<IndexedPassage>,
}

impl VectorStore {
    pub fn new(embedder: impl Into<String>, dimensions: usize) -> Self {
        Self {
            embedder: embedder.into(),
            dimensions,
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, passage: Passage, embedding: Vec<f32>) {
        self.entries.push(IndexedPassage { passage, embedding });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn embedder(&self) -> &str {
        &self.embedder
    }

    /// Top-`k` passages by descending similarity.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(&Passage, f32)> {
        let mut scored: Vec<(&Passage, f32)> = self
            .entries
            .iter()
            .map(|entry| (&entry.passage, cosine_similarity(query, &entry.embedding)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        scored
    }

    /// Load a persisted index. Missing or empty files yield `None`.
    pub async fn load(path: &Path) -> Result<Option<Self>> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let store: VectorStore = serde_json::from_str(&raw)?;
        Ok((!store.is_empty()).then_some(store))
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let raw = serde_json::to_string(self)?;
        tokio::fs::write(path, raw).await?;
        Ok(())
    }

    /// Chunk and embed every document under `docs_dir`.
    pub async fn build(docs_dir: &Path, embedder: &dyn EmbeddingProvider) -> Result<Self> {
        let documents = load_documents(docs_dir.to_path_buf()).await?;
        let mut store = VectorStore::new(embedder.name(), embedder.dimensions());

        let mut passages: Vec<Passage> = Vec::new();
        for (source, text) in &documents {
            passages.extend(chunk_text(
                source,
                text,
                DEFAULT_CHUNK_SIZE,
                DEFAULT_CHUNK_OVERLAP,
            )?);
        }

        for batch in passages.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|p| p.text.clone()).collect();
            let embeddings = embedder.embed_batch(&texts).await?;
            if embeddings.len() != batch.len() {
                return Err(AgentError::RetrievalFailure(format!(
                    "Embedder returned {} vectors for {} passages",
                    embeddings.len(),
                    batch.len()
                )));
            }
            for (passage, embedding) in batch.iter().cloned().zip(embeddings) {
                store.insert(passage, embedding);
            }
        }

        info!(
            target: "travel::knowledge",
            documents = documents.len(),
            passages = store.len(),
            "built document index"
        );
        Ok(store)
    }

    /// Reuse the persisted index at `path` when present, otherwise build and persist one.
    pub async fn open_or_build(
        path: &Path,
        docs_dir: &Path,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Self> {
        if let Some(store) = Self::load(path).await? {
            if store.embedder == embedder.name() {
                info!(
                    target: "travel::knowledge",
                    path = %path.display(),
                    passages = store.len(),
                    "reusing persisted index"
                );
                return Ok(store);
            }
            warn!(
                target: "travel::knowledge",
                persisted = %store.embedder,
                current = %embedder.name(),
                "persisted index was built with a different embedder, rebuilding"
            );
        }

        let store = Self::build(docs_dir, embedder).await?;
        if !store.is_empty() {
            store.save(path).await?;
        }
        Ok(store)
    }
}

async fn load_documents(docs_dir: PathBuf) -> Result<Vec<(String, String)>> {
    if !docs_dir.is_dir() {
        warn!(
            target: "travel::knowledge",
            dir = %docs_dir.display(),
            "document folder not found, index will be empty"
        );
        return Ok(Vec::new());
    }

    tokio::task::spawn_blocking(move || {
        let mut documents = Vec::new();
        for entry in WalkDir::new(&docs_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
        {
            let path = entry.path();
            let supported = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| DOCUMENT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false);
            if !supported {
                continue;
            }
            info!(target: "travel::knowledge", path = %path.display(), "loading document");
            let text = std::fs::read_to_string(path)?;
            let source = path
                .strip_prefix(&docs_dir)
                .unwrap_or(path)
                .display()
                .to_string();
            documents.push((source, text));
        }
        Ok::<_, AgentError>(documents)
    })
    .await
    .map_err(|err| AgentError::Unknown(format!("Document loading task failed: {err}")))?
}
