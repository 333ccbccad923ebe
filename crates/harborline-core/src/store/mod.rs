//! Vector store abstraction.
//!
//! The [`VectorStore`] trait covers everything the indexing and retrieval
//! pipeline needs from a store: idempotent collection initialization,
//! batch upsert, and nearest-neighbor search by cosine similarity. The
//! SQLite-backed implementation lives in the app crate; [`memory`]
//! provides a brute-force in-memory store for tests.

pub mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{IndexedPoint, ScoredPoint};

/// Abstract vector store backend.
///
/// Implementations must be `Send + Sync`; retrieval is read-mostly and may
/// be served concurrently, while indexing is a one-shot batch job.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Ensure a collection exists with the given vector dimensionality.
    ///
    /// Creation is compare-and-create: concurrent initializers never
    /// produce duplicate collections, and an existing collection is reused
    /// as long as its dims match ([`StoreError::DimsMismatch`] otherwise).
    async fn init_collection(&self, name: &str, dims: usize) -> Result<(), StoreError>;

    /// Insert or replace points by id. Each call is atomic: a failed batch
    /// never corrupts previously committed batches.
    async fn upsert(&self, collection: &str, points: &[IndexedPoint]) -> Result<(), StoreError>;

    /// Return the `limit` nearest points by cosine similarity, descending.
    async fn search(
        &self,
        collection: &str,
        query_vec: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, StoreError>;
}
