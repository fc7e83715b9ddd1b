//! Separator-aware chunking with overlap.
//!
//! Splits prefer paragraph, then sentence, then word boundaries, so a
//! passage only cuts through a word when a single word exceeds the chunk
//! size.

use crate::{AgentError, Result};
use serde::{Deserialize, Serialize};
use text_splitter::{ChunkConfig, TextSplitter};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// A retrievable slice of a source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub source: String,
    pub position: u32,
    pub text: String,
}

/// Split `text` into passages of at most `chunk_size` characters, with up
/// to `overlap` characters repeated between neighbours.
///
/// Fails with a config error when `overlap` is not smaller than `chunk_size`.
pub fn chunk_text(
    source: &str,
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<Passage>> {
    if chunk_size == 0 || text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let config = ChunkConfig::new(chunk_size)
        .with_overlap(overlap)
        .map_err(|err| AgentError::Config(format!("Invalid chunking parameters: {}", err)))?;
    let splitter = TextSplitter::new(config);

    let passages: Vec<Passage> = splitter
        .chunks(text)
        .filter(|chunk| !chunk.trim().is_empty())
        .enumerate()
        .map(|(position, chunk)| Passage {
            source: source.to_string(),
            position: position as u32,
            text: chunk.to_string(),
        })
        .collect();

    tracing::debug!(
        target: "travel::knowledge",
        source,
        chunks = passages.len(),
        chunk_size,
        overlap,
        "chunked document"
    );

    Ok(passages)
}
