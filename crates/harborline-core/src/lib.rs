//! # Harborline Core
//!
//! Shared, I/O-free logic for the Harborline answering pipeline: data
//! models, token counting, chunking, record adapters, the relevance gate,
//! prompt templates, response post-processing, the vector store trait, and
//! the retrieval/context-assembly step.
//!
//! This crate contains no tokio, sqlx, or network dependencies. Everything
//! here is deterministic and unit-testable; the `harborline` app crate
//! supplies the SQLite store, HTTP embedder, and language-model gateway.

pub mod chunk;
pub mod embedding;
pub mod error;
pub mod generate;
pub mod messages;
pub mod models;
pub mod postprocess;
pub mod prompt;
pub mod records;
pub mod relevance;
pub mod retrieve;
pub mod store;
pub mod token;
