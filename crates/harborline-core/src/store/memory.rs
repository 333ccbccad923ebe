//! In-memory [`VectorStore`] implementation for tests.
//!
//! `HashMap`s behind `std::sync::RwLock`; search is brute-force cosine
//! similarity over every stored vector, which is exactly what the tests
//! need and what the SQLite store does at a larger scale.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::embedding::cosine_similarity;
use crate::error::StoreError;
use crate::models::{IndexedPoint, ScoredPoint};

use super::VectorStore;

#[derive(Default)]
struct Collection {
    dims: usize,
    points: HashMap<i64, IndexedPoint>,
}

/// Brute-force in-memory vector index.
#[derive(Default)]
pub struct InMemoryIndex {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of points currently held in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .expect("lock poisoned")
            .get(collection)
            .map_or(0, |c| c.points.len())
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl VectorStore for InMemoryIndex {
    async fn init_collection(&self, name: &str, dims: usize) -> Result<(), StoreError> {
        let mut collections = self.collections.write().expect("lock poisoned");
        match collections.get(name) {
            Some(existing) if existing.dims != dims => Err(StoreError::DimsMismatch {
                name: name.to_string(),
                existing: existing.dims,
                requested: dims,
            }),
            Some(_) => Ok(()),
            None => {
                collections.insert(
                    name.to_string(),
                    Collection {
                        dims,
                        points: HashMap::new(),
                    },
                );
                Ok(())
            }
        }
    }

    async fn upsert(&self, collection: &str, points: &[IndexedPoint]) -> Result<(), StoreError> {
        let mut collections = self.collections.write().expect("lock poisoned");
        let entry = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        for point in points {
            entry.points.insert(point.id, point.clone());
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query_vec: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, StoreError> {
        let collections = self.collections.read().expect("lock poisoned");
        let entry = collections
            .get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;

        let mut hits: Vec<ScoredPoint> = entry
            .points
            .values()
            .map(|p| ScoredPoint {
                id: p.id,
                score: cosine_similarity(query_vec, &p.vector),
                payload: p.payload.clone(),
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        hits.truncate(limit);
        Ok(hits)
    }
}
