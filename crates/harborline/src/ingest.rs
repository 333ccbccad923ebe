//! Knowledge-base ingestion: files → records → chunks → vectors → store.
//!
//! The resource manifest below is the single place where filenames map to
//! record shapes; everything downstream dispatches on [`RecordKind`], not
//! on names. Missing files are skipped with a note so a partial data
//! directory still indexes.
//!
//! Point ids are dense and 0-based in corpus order. Re-running `index`
//! against an existing collection overwrites ids from 0 up; if the new
//! corpus is smaller, stale higher ids from the previous run remain in the
//! store. Rebuild into a fresh store file when shrinking the corpus.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use harborline_core::chunk::Chunker;
use harborline_core::embedding::Embedder;
use harborline_core::models::{Chunk, IndexedPoint};
use harborline_core::records::{parse_records, RecordKind};
use harborline_core::store::VectorStore;

use crate::config::Config;

/// Filename → record shape, one entry per known resource.
const RESOURCES: [(&str, RecordKind); 8] = [
    ("faqs.json", RecordKind::Faq),
    ("services.json", RecordKind::Service),
    ("programs.json", RecordKind::Program),
    ("org.json", RecordKind::Organization),
    ("contacts.json", RecordKind::Tabular),
    ("faq_converted.json", RecordKind::Faq),
    ("org_converted.json", RecordKind::Tabular),
    ("services_master_converted.json", RecordKind::Tabular),
];

const UPSERT_BATCH_SIZE: usize = 100;

/// Per-run ingestion summary for reporting.
pub struct IndexReport {
    /// `(filename, chunk count)` for each file found and processed.
    pub files: Vec<(String, usize)>,
    pub chunks_indexed: usize,
}

/// Build (or rebuild) the knowledge-base index from a data directory.
pub async fn index_documents(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    config: &Config,
    data_dir: &Path,
) -> Result<IndexReport> {
    let chunker = Chunker::new(config.chunking.max_tokens);

    let mut chunks: Vec<Chunk> = Vec::new();
    let mut files: Vec<(String, usize)> = Vec::new();

    for (filename, kind) in RESOURCES {
        let path = data_dir.join(filename);
        if !path.exists() {
            continue;
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let data: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let before = chunks.len();
        for record in parse_records(kind, &data) {
            if let Some((text, metadata)) = record.flatten(filename) {
                chunks.extend(chunker.chunk(&text, &metadata));
            }
        }
        files.push((filename.to_string(), chunks.len() - before));
    }

    if chunks.is_empty() {
        bail!("No chunks produced; is the data directory empty?");
    }

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = embedder.embed_batch(&texts).await?;
    if vectors.len() != chunks.len() {
        bail!(
            "Embedder returned {} vectors for {} chunks",
            vectors.len(),
            chunks.len()
        );
    }

    let points: Vec<IndexedPoint> = chunks
        .iter()
        .zip(vectors)
        .enumerate()
        .map(|(id, (chunk, vector))| IndexedPoint {
            id: id as i64,
            vector,
            payload: chunk_payload(chunk),
        })
        .collect();

    store
        .init_collection(&config.store.collection, embedder.dims())
        .await?;
    for batch in points.chunks(UPSERT_BATCH_SIZE) {
        store.upsert(&config.store.collection, batch).await?;
    }

    Ok(IndexReport {
        files,
        chunks_indexed: points.len(),
    })
}

/// Flattened `{text, tokens, ...metadata}` payload stored with the vector.
fn chunk_payload(chunk: &Chunk) -> Value {
    let mut payload = chunk.metadata.clone();
    payload.insert("text".into(), chunk.text.clone().into());
    payload.insert("tokens".into(), (chunk.tokens as u64).into());
    Value::Object(payload)
}
