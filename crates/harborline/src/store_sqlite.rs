//! SQLite-backed [`VectorStore`] implementation.
//!
//! One SQLite file holds the deployment's collections: a `collections`
//! table carrying the dims contract and a `points` table keyed by
//! `(collection, id)` with the vector stored as a little-endian f32 BLOB.
//!
//! Collection creation is compare-and-create — the `INSERT .. ON CONFLICT
//! DO NOTHING` either wins or observes the winner, so concurrent
//! initializers never produce duplicates, and a dims mismatch against an
//! existing collection is a typed error. Each upsert batch runs in one
//! transaction, so a failed batch never corrupts previously committed
//! ones. Search is brute-force cosine over the collection, which is more
//! than enough for a knowledge base of this size.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use harborline_core::embedding::{blob_to_vec, cosine_similarity, vec_to_blob};
use harborline_core::error::StoreError;
use harborline_core::models::{IndexedPoint, ScoredPoint};
use harborline_core::store::VectorStore;

pub struct SqliteIndex {
    pool: SqlitePool,
}

impl SqliteIndex {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn collection_dims(&self, name: &str) -> Result<Option<usize>, StoreError> {
        let dims: Option<i64> =
            sqlx::query_scalar("SELECT dims FROM collections WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;
        Ok(dims.map(|d| d as usize))
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl VectorStore for SqliteIndex {
    async fn init_collection(&self, name: &str, dims: usize) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO collections (name, dims, distance) VALUES (?, ?, 'cosine') \
             ON CONFLICT(name) DO NOTHING",
        )
        .bind(name)
        .bind(dims as i64)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        match self.collection_dims(name).await? {
            Some(existing) if existing != dims => Err(StoreError::DimsMismatch {
                name: name.to_string(),
                existing,
                requested: dims,
            }),
            Some(_) => Ok(()),
            None => Err(StoreError::UnknownCollection(name.to_string())),
        }
    }

    async fn upsert(&self, collection: &str, points: &[IndexedPoint]) -> Result<(), StoreError> {
        if self.collection_dims(collection).await?.is_none() {
            return Err(StoreError::UnknownCollection(collection.to_string()));
        }

        let mut tx = self.pool.begin().await.map_err(backend)?;
        for point in points {
            let payload = serde_json::to_string(&point.payload)
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            sqlx::query(
                "INSERT INTO points (collection, id, vector, payload_json) VALUES (?, ?, ?, ?) \
                 ON CONFLICT(collection, id) DO UPDATE SET \
                 vector = excluded.vector, payload_json = excluded.payload_json",
            )
            .bind(collection)
            .bind(point.id)
            .bind(vec_to_blob(&point.vector))
            .bind(payload)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        }
        tx.commit().await.map_err(backend)?;
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query_vec: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, StoreError> {
        if self.collection_dims(collection).await?.is_none() {
            return Err(StoreError::UnknownCollection(collection.to_string()));
        }

        let rows = sqlx::query("SELECT id, vector, payload_json FROM points WHERE collection = ?")
            .bind(collection)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        let mut hits: Vec<ScoredPoint> = rows
            .into_iter()
            .map(|row| {
                let id: i64 = row.get("id");
                let blob: Vec<u8> = row.get("vector");
                let payload_json: String = row.get("payload_json");
                let payload =
                    serde_json::from_str(&payload_json).unwrap_or(serde_json::Value::Null);
                ScoredPoint {
                    id,
                    score: cosine_similarity(query_vec, &blob_to_vec(&blob)),
                    payload,
                }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate::run_migrations;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn index() -> SqliteIndex {
        // one connection: each in-memory sqlite connection is its own db
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteIndex::new(pool)
    }

    fn point(id: i64, vector: Vec<f32>, text: &str) -> IndexedPoint {
        IndexedPoint {
            id,
            vector,
            payload: json!({"text": text, "tokens": 3, "source": "faqs.json", "type": "faq"}),
        }
    }

    #[tokio::test]
    async fn test_init_idempotent_and_dims_checked() {
        let store = index().await;
        store.init_collection("kb", 4).await.unwrap();
        store.init_collection("kb", 4).await.unwrap();
        let err = store.init_collection("kb", 8).await.unwrap_err();
        assert!(matches!(err, StoreError::DimsMismatch { .. }));
    }

    #[tokio::test]
    async fn test_upsert_and_search_roundtrip() {
        let store = index().await;
        store.init_collection("kb", 2).await.unwrap();
        store
            .upsert(
                "kb",
                &[
                    point(0, vec![1.0, 0.0], "east"),
                    point(1, vec![0.0, 1.0], "north"),
                    point(2, vec![0.9, 0.1], "mostly east"),
                ],
            )
            .await
            .unwrap();

        let hits = store.search("kb", &[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, 0);
        assert_eq!(hits[1].id, 2);
        assert!(hits[0].score >= hits[1].score);
        assert_eq!(hits[0].payload.get("text").unwrap(), "east");
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let store = index().await;
        store.init_collection("kb", 2).await.unwrap();
        store
            .upsert("kb", &[point(0, vec![1.0, 0.0], "before")])
            .await
            .unwrap();
        store
            .upsert("kb", &[point(0, vec![1.0, 0.0], "after")])
            .await
            .unwrap();

        let hits = store.search("kb", &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].payload.get("text").unwrap(), "after");
    }

    #[tokio::test]
    async fn test_search_unknown_collection() {
        let store = index().await;
        assert!(matches!(
            store.search("missing", &[1.0], 1).await.unwrap_err(),
            StoreError::UnknownCollection(_)
        ));
    }

    #[tokio::test]
    async fn test_scores_descending_with_k_cap() {
        let store = index().await;
        store.init_collection("kb", 3).await.unwrap();
        let points: Vec<IndexedPoint> = (0..20)
            .map(|i| point(i, vec![1.0, i as f32 * 0.1, 0.0], "p"))
            .collect();
        store.upsert("kb", &points).await.unwrap();

        let hits = store.search("kb", &[1.0, 0.0, 0.0], 7).await.unwrap();
        assert_eq!(hits.len(), 7);
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}
