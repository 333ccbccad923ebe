//! Core data models used throughout the Harborline pipeline.
//!
//! These types represent the chunks, indexed points, and retrieval results
//! that flow from ingestion through search to the final answer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Flat key/value metadata attached to a chunk and carried in the store
/// payload (`source`, `type`, plus per-kind fields).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A bounded-length unit of text with provenance metadata.
///
/// Immutable once produced by the chunker. `tokens` never exceeds the
/// configured maximum except when a single whitespace-delimited word alone
/// exceeds it, in which case the chunk is accepted oversized rather than
/// dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub tokens: usize,
    pub metadata: Metadata,
}

/// A vectorized chunk as stored in the index.
///
/// Ids are dense, 0-based, and assigned in corpus order at index-build
/// time; they are not stable across rebuilds.
#[derive(Debug, Clone)]
pub struct IndexedPoint {
    pub id: i64,
    pub vector: Vec<f32>,
    /// Flattened `{text, tokens, ...metadata}` object.
    pub payload: serde_json::Value,
}

/// A nearest-neighbor hit returned by the vector store, cosine score in
/// `[-1, 1]`, descending order.
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    pub id: i64,
    pub score: f32,
    pub payload: serde_json::Value,
}

/// A retrieved document mapped back from a store payload. Ephemeral,
/// produced per query, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedDoc {
    pub text: String,
    pub score: f32,
    pub source: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub metadata: serde_json::Value,
}

/// Lightweight `(source, score)` reference included in the answer for the
/// caller to log.
#[derive(Debug, Clone, Serialize)]
pub struct DocRef {
    pub source: String,
    pub score: f32,
}

/// The boundary contract returned to the caller. `response` is always a
/// non-empty, user-facing string.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub response: String,
    pub retrieved_docs: Vec<DocRef>,
    pub context: String,
}

/// Supported response languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Vi,
}

impl FromStr for Language {
    type Err = std::convert::Infallible;

    /// Unknown codes fall back to English rather than erroring; the
    /// language selector only affects copy, never correctness.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "vi" | "vn" => Language::Vi,
            _ => Language::En,
        })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::En => write!(f, "en"),
            Language::Vi => write!(f, "vi"),
        }
    }
}

/// Organization contact details substituted into canned messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
}

impl Default for ContactInfo {
    fn default() -> Self {
        Self {
            email: "info@harborline.org".to_string(),
            phone: "+1-416-555-0148".to_string(),
        }
    }
}
