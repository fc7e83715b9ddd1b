//! Retrieval-augmented answers over a local document collection

pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod retriever;

pub use chunker::{chunk_text, Passage};
pub use embeddings::{EmbeddingProvider, RemoteEmbedder, TrigramEmbedder};
pub use index::VectorStore;
pub use retriever::{KnowledgeRetriever, SharedIndex, TextGenerator};
