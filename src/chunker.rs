//! Line-aligned, bounded-size chunking of a corpus
//!
//! Chunks are cut greedily: each one takes up to `bound_size` characters and,
//! unless it reaches the end of the text, ends just after the last line break
//! at or before the candidate boundary. A line break sitting exactly on the
//! boundary still closes the chunk, so a chunk may hold `bound_size`
//! characters plus its terminating `\n`. When no such line break exists (a
//! single line longer than the bound) the chunk is cut exactly at
//! `bound_size` characters and flagged with [`Chunk::forced_cut`]; that line
//! then continues in the next chunk. Concatenating the chunks in ordinal
//! order always reproduces the corpus byte for byte.

use crate::error::ChunkingError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One bounded slice of a corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Chunk {
    /// Position of this chunk in the corpus, starting at 0
    pub ordinal: usize,
    /// The chunk text, including its trailing line break when it has one
    pub text: String,
    /// True when the chunk was cut inside an over-long line
    #[serde(default)]
    pub forced_cut: bool,
}

impl Chunk {
    /// Character count of the chunk text
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Splits corpora into chunks of at most `bound_size` characters, not
/// counting a line break that falls exactly on the boundary
#[derive(Debug, Clone, Copy)]
pub struct CorpusChunker {
    bound_size: usize,
}

impl CorpusChunker {
    /// Create a chunker, rejecting a zero bound before any work is done
    pub fn new(bound_size: usize) -> Result<Self, ChunkingError> {
        if bound_size == 0 {
            return Err(ChunkingError::InvalidBoundSize(bound_size));
        }
        Ok(Self { bound_size })
    }

    pub fn bound_size(&self) -> usize {
        self.bound_size
    }

    /// Chunk `corpus`; an empty corpus yields no chunks
    pub fn chunk(&self, corpus: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < corpus.len() {
            let rest = &corpus[start..];

            // Byte offset of the first character past the bound, if any
            let Some((window_end, _)) = rest.char_indices().nth(self.bound_size) else {
                chunks.push(Chunk {
                    ordinal: chunks.len(),
                    text: rest.to_string(),
                    forced_cut: false,
                });
                break;
            };

            let line_end = if rest[window_end..].starts_with('\n') {
                Some(window_end)
            } else {
                rest[..window_end].rfind('\n')
            };
            let (len, forced_cut) = match line_end {
                Some(newline) => (newline + 1, false),
                None => (window_end, true),
            };

            if forced_cut {
                tracing::debug!(
                    "Line longer than {} characters at byte {}, cutting mid-line",
                    self.bound_size,
                    start
                );
            }

            chunks.push(Chunk {
                ordinal: chunks.len(),
                text: rest[..len].to_string(),
                forced_cut,
            });
            start += len;
        }

        chunks
    }
}

/// Chunk `corpus` with the given bound
pub fn chunk(corpus: &str, bound_size: usize) -> Result<Vec<Chunk>, ChunkingError> {
    Ok(CorpusChunker::new(bound_size)?.chunk(corpus))
}

/// Concatenate chunks in ordinal order
pub fn reassemble(chunks: &[Chunk]) -> String {
    let mut ordered: Vec<&Chunk> = chunks.iter().collect();
    ordered.sort_by_key(|c| c.ordinal);
    ordered.iter().map(|c| c.text.as_str()).collect()
}
