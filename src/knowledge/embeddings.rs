//! Embedding providers used to index and query passages.

use crate::error::{AgentError, Result};
use crate::services::openai_client::OpenAIClient;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Identifier stored with a persisted index, e.g. `trigram-384`
    fn name(&self) -> String;

    fn dimensions(&self) -> usize;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| AgentError::RetrievalFailure("No embedding returned".to_string()))
    }
}

/// Offline, deterministic embeddings from hashed words and character trigrams.
#[derive(Debug, Clone)]
pub struct TrigramEmbedder {
    dimensions: usize,
}

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "was", "were", "with", "from", "this", "that", "have", "has",
    "had", "its", "their", "they", "them", "you", "your", "what", "which", "how", "can",
];

fn bucket(token: &str, seed: u64, dimensions: usize) -> usize {
    let hash = token
        .bytes()
        .fold(seed, |acc, b| acc.wrapping_mul(1_099_511_628_211) ^ u64::from(b));
    (hash % dimensions as u64) as usize
}

impl TrigramEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();

        let mut frequencies: HashMap<&str, u32> = HashMap::new();
        for word in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        {
            *frequencies.entry(word).or_insert(0) += 1;
        }

        for (word, count) in frequencies {
            let weight = (count as f32).sqrt();
            vector[bucket(word, 0xcbf2_9ce4_8422_2325, self.dimensions)] += count as f32;

            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                vector[bucket(&trigram, 0x8422_2325_cbf2_9ce4, self.dimensions)] += weight;
            }
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for TrigramEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

#[async_trait]
impl EmbeddingProvider for TrigramEmbedder {
    fn name(&self) -> String {
        format!("trigram-{}", self.dimensions)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

/// Embeddings from an OpenAI-compatible `/embeddings` endpoint
#[derive(Debug, Clone)]
pub struct RemoteEmbedder {
    client: OpenAIClient,
    model: String,
    dimensions: usize,
}

impl RemoteEmbedder {
    pub fn new(client: OpenAIClient, model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            client,
            model: model.into(),
            dimensions,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for RemoteEmbedder {
    fn name(&self) -> String {
        format!("remote-{}", self.model)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.client.embeddings(&self.model, texts).await
    }
}

/// Cosine similarity; zero when either vector is empty or all zeros.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigram_is_deterministic_and_normalized() {
        let embedder = TrigramEmbedder::new(64);
        let a = embedder.embed("Beaches of Goa in monsoon").await.unwrap();
        let b = embedder.embed("Beaches of Goa in monsoon").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_related_text_scores_higher() {
        let embedder = TrigramEmbedder::default();
        let query = embedder.embed("visa requirements for Dubai").await.unwrap();
        let related = embedder
            .embed("Dubai visa requirements for Indian passport holders")
            .await
            .unwrap();
        let unrelated = embedder
            .embed("Trekking routes around Manali in winter")
            .await
            .unwrap();
        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
    }
}
