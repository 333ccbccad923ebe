//! Query-time retrieval and context assembly.
//!
//! [`retrieve`] embeds the query with the same embedder used at index
//! time, searches the vector store, and maps each hit's payload back into
//! a [`RetrievedDoc`]. No score threshold is applied: low-similarity hits
//! are returned and left to prompt construction and the model to discount.
//!
//! [`assemble_context`] renders the docs into one text blob with
//! per-document provenance headers, preserving retrieval order (which is
//! the store's descending-score order; nothing is re-sorted here).

use anyhow::Result;

use crate::embedding::Embedder;
use crate::models::RetrievedDoc;
use crate::store::VectorStore;

/// Retrieve the `top_k` most similar chunks for a query.
pub async fn retrieve(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    collection: &str,
    query: &str,
    top_k: usize,
) -> Result<Vec<RetrievedDoc>> {
    let query_vec = embedder.embed_query(query).await?;
    let hits = store.search(collection, &query_vec, top_k).await?;

    Ok(hits
        .into_iter()
        .map(|hit| {
            let payload = hit.payload;
            RetrievedDoc {
                text: payload
                    .get("text")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                score: hit.score,
                source: payload_str(&payload, "source"),
                doc_type: payload_str(&payload, "type"),
                metadata: payload,
            }
        })
        .collect())
}

fn payload_str(payload: &serde_json::Value, key: &str) -> String {
    payload
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Render retrieved docs into a single grounded context string.
pub fn assemble_context(docs: &[RetrievedDoc]) -> String {
    let parts: Vec<String> = docs
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            format!(
                "[Document {}] (Source: {}, Score: {:.3})\n{}\n",
                i + 1,
                doc.source,
                doc.score,
                doc.text
            )
        })
        .collect();
    parts.join("\n")
}
