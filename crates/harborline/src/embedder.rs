//! Concrete embedding backends.
//!
//! Two providers, selected by `embedding.provider`:
//! - `"local"` — [`LocalHashEmbedder`], a deterministic hashing embedder
//!   with no model download and no network. The vectors carry no semantic
//!   meaning beyond token overlap, but they are stable across runs and
//!   machines, which is what the test suite and offline deployments need.
//! - `"ollama"` — [`OllamaEmbedder`], which calls an Ollama server's
//!   `/api/embed` endpoint with bounded retry on transient failures.
//!
//! Both implement the same [`Embedder`] trait; indexing and querying never
//! know which one they were handed.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use harborline_core::embedding::Embedder;

use crate::config::EmbeddingConfig;

/// Build the embedder named by the config.
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    match config.provider.as_str() {
        "local" => Ok(Box::new(LocalHashEmbedder::new(config.dims))),
        "ollama" => {
            let model = config
                .model
                .clone()
                .context("embedding.model is required for the ollama provider")?;
            let base_url = config
                .base_url
                .clone()
                .context("embedding.base_url is required for the ollama provider")?;
            Ok(Box::new(OllamaEmbedder::new(
                base_url,
                model,
                config.dims,
                config.batch_size,
                config.max_retries,
                config.timeout_secs,
            )?))
        }
        other => bail!("Unknown embedding provider: '{}'", other),
    }
}

/// Deterministic hashing embedder.
///
/// Tokenizes on non-alphanumeric boundaries (lowercased), hashes each token
/// into a bucket, and adds a smaller contribution for each adjacent-token
/// bigram so word order shifts the vector a little. The result is
/// L2-normalized; an input with no tokens embeds to the zero vector.
pub struct LocalHashEmbedder {
    dims: usize,
}

impl LocalHashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];
        let tokens: Vec<String> = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect();

        for token in &tokens {
            vector[bucket(token, self.dims)] += 1.0;
        }
        for pair in tokens.windows(2) {
            let bigram = format!("{} {}", pair[0], pair[1]);
            vector[bucket(&bigram, self.dims)] += 0.5;
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

fn bucket(token: &str, dims: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    (hasher.finish() % dims as u64) as usize
}

#[async_trait]
impl Embedder for LocalHashEmbedder {
    fn model_name(&self) -> &str {
        "local-hash"
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// Embedding client for an Ollama server.
pub struct OllamaEmbedder {
    base_url: String,
    model: String,
    dims: usize,
    batch_size: usize,
    max_retries: u32,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    pub fn new(
        base_url: String,
        model: String,
        dims: usize,
        batch_size: usize,
        max_retries: u32,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            dims,
            batch_size: batch_size.max(1),
            max_retries,
            client,
        })
    }

    async fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.base_url);
        let body = json!({
            "model": self.model,
            "input": texts,
        });

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let response = self.client.post(&url).json(&body).send().await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let parsed: EmbedResponse = resp
                        .json()
                        .await
                        .context("Failed to parse embedding response")?;
                    if parsed.embeddings.len() != texts.len() {
                        bail!(
                            "Embedding server returned {} vectors for {} inputs",
                            parsed.embeddings.len(),
                            texts.len()
                        );
                    }
                    for vector in &parsed.embeddings {
                        if vector.len() != self.dims {
                            bail!(
                                "Embedding server returned {} dims, expected {}",
                                vector.len(),
                                self.dims
                            );
                        }
                    }
                    return Ok(parsed.embeddings);
                }
                Ok(resp) => {
                    let status = resp.status();
                    let retryable =
                        status.as_u16() == 429 || status.is_server_error();
                    if !retryable {
                        let text = resp.text().await.unwrap_or_default();
                        bail!("Embedding request failed ({}): {}", status, text);
                    }
                    if attempt > self.max_retries {
                        bail!(
                            "Embedding request failed after {} retries (last status {})",
                            self.max_retries,
                            status
                        );
                    }
                }
                Err(err) => {
                    if attempt > self.max_retries {
                        return Err(err).context(format!(
                            "Embedding request failed after {} retries",
                            self.max_retries
                        ));
                    }
                }
            }

            let backoff = Duration::from_secs(1 << (attempt - 1).min(5));
            eprintln!(
                "Embedding request failed (attempt {}), retrying in {:?}...",
                attempt, backoff
            );
            tokio::time::sleep(backoff).await;
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            vectors.extend(self.embed_chunk(chunk).await?);
        }
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_embedder_deterministic() {
        let embedder = LocalHashEmbedder::new(64);
        let a = embedder.embed_query("Where is the office located?").await.unwrap();
        let b = embedder.embed_query("Where is the office located?").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn test_local_embedder_normalized() {
        let embedder = LocalHashEmbedder::new(32);
        let v = embedder.embed_query("housing support programs").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_local_embedder_empty_is_zero_vector() {
        let embedder = LocalHashEmbedder::new(16);
        let v = embedder.embed_query("   ").await.unwrap();
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_local_embedder_distinct_texts_differ() {
        let embedder = LocalHashEmbedder::new(128);
        let a = embedder.embed_query("english classes").await.unwrap();
        let b = embedder.embed_query("legal aid clinic").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let embedder = LocalHashEmbedder::new(64);
        let texts = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let batch = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0], embedder.embed_query("one").await.unwrap());
        assert_eq!(batch[2], embedder.embed_query("three").await.unwrap());
    }

    #[test]
    fn test_create_embedder_local() {
        let config = EmbeddingConfig {
            dims: 48,
            ..Default::default()
        };
        let embedder = create_embedder(&config).unwrap();
        assert_eq!(embedder.model_name(), "local-hash");
        assert_eq!(embedder.dims(), 48);
    }

    #[test]
    fn test_create_embedder_ollama_requires_model() {
        let config = EmbeddingConfig {
            provider: "ollama".to_string(),
            ..Default::default()
        };
        assert!(create_embedder(&config).is_err());
    }
}
