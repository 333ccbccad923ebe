//! Sentence-boundary text chunker.
//!
//! Splits record text into [`Chunk`]s that respect a configurable
//! `max_tokens` limit. Splitting occurs on `". "` sentence boundaries; a
//! trailing period is re-appended to every unit that lacks one, so text
//! whose sentences end without a period acquires a synthetic one. This is
//! a lossy transform inherited from the data pipeline this feeds.
//!
//! # Algorithm
//!
//! 1. Split text on `". "` into sentence-like units; skip empty units.
//! 2. Greedily accumulate units into a buffer while the running token
//!    total stays within `max_tokens`.
//! 3. On overflow, flush the buffer as a chunk and start a new one with
//!    the overflowing unit.
//! 4. If a single unit alone exceeds `max_tokens`, flush any pending
//!    buffer, then re-split the unit by whitespace words with the same
//!    greedy rule; the word-level remainder seeds the next buffer. A
//!    single word that still exceeds the limit is emitted oversized, never
//!    dropped.
//! 5. Any non-empty buffer at end of input becomes a final chunk.

use crate::models::{Chunk, Metadata};
use crate::token::TokenCounter;

/// Sentence-boundary chunker with a fixed token budget.
#[derive(Debug, Clone)]
pub struct Chunker {
    max_tokens: usize,
    counter: TokenCounter,
}

impl Chunker {
    pub fn new(max_tokens: usize) -> Self {
        Self {
            max_tokens,
            counter: TokenCounter::new(),
        }
    }

    /// Chunk `text`, attaching a copy of `metadata` to every chunk.
    ///
    /// Deterministic, no I/O. Empty or whitespace-only input yields an
    /// empty sequence.
    pub fn chunk(&self, text: &str, metadata: &Metadata) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut buf = String::new();
        let mut buf_tokens = 0usize;

        for raw in text.split(". ") {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }

            let mut unit = trimmed.to_string();
            if !unit.ends_with('.') {
                unit.push('.');
            }
            let unit_tokens = self.counter.count(&unit);

            if unit_tokens > self.max_tokens {
                if !buf.is_empty() {
                    chunks.push(self.make_chunk(&buf, buf_tokens, metadata));
                    buf.clear();
                    buf_tokens = 0;
                }
                let remainder = self.split_by_words(&unit, metadata, &mut chunks);
                if let Some(piece) = remainder {
                    buf_tokens = self.counter.count(&piece);
                    buf = piece;
                }
            } else if buf_tokens + unit_tokens <= self.max_tokens {
                if buf.is_empty() {
                    buf = unit;
                } else {
                    buf.push(' ');
                    buf.push_str(&unit);
                }
                buf_tokens += unit_tokens;
            } else {
                if !buf.is_empty() {
                    chunks.push(self.make_chunk(&buf, buf_tokens, metadata));
                }
                buf = unit;
                buf_tokens = unit_tokens;
            }
        }

        if !buf.is_empty() {
            chunks.push(self.make_chunk(&buf, buf_tokens, metadata));
        }

        chunks
    }

    /// Word-level re-split for a unit whose token count alone exceeds the
    /// budget. Completed pieces are pushed as chunks; the trailing piece is
    /// returned so it can seed the next sentence buffer.
    fn split_by_words(
        &self,
        unit: &str,
        metadata: &Metadata,
        chunks: &mut Vec<Chunk>,
    ) -> Option<String> {
        let mut piece = String::new();

        for word in unit.split_whitespace() {
            let candidate = if piece.is_empty() {
                word.to_string()
            } else {
                format!("{piece} {word}")
            };
            if self.counter.count(&candidate) > self.max_tokens {
                if !piece.is_empty() {
                    let tokens = self.counter.count(&piece);
                    chunks.push(self.make_chunk(&piece, tokens, metadata));
                }
                piece = word.to_string();
            } else {
                piece = candidate;
            }
        }

        if piece.is_empty() {
            None
        } else {
            Some(piece)
        }
    }

    fn make_chunk(&self, text: &str, tokens: usize, metadata: &Metadata) -> Chunk {
        Chunk {
            text: text.trim().to_string(),
            tokens,
            metadata: metadata.clone(),
        }
    }
}
