//! Typed failures for the vector store and the language-model gateway.
//!
//! Gateway failures are never surfaced to the caller — every variant routes
//! the service into the fallback-extraction path. Store failures are fatal
//! at startup (after the bounded lock retry) and carry remediation text.

use thiserror::Error;

/// Failure modes of the language-model gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The endpoint signalled rate limiting or overload; probing stops
    /// immediately instead of hammering further variants.
    #[error("generation endpoint is overloaded or rate limited")]
    Overloaded,

    /// Every endpoint variant was tried and none produced a response.
    #[error("all generation endpoint variants failed")]
    Exhausted,
}

/// Failure modes of the vector store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another process holds the store open. Raised only after the
    /// configured retry budget is spent.
    #[error(
        "vector store at {path} is locked after {attempts} attempts; another instance may be \
         running — stop it or remove a stale lock file, then retry"
    )]
    Locked { path: String, attempts: u32 },

    /// The collection exists but was built with a different embedding
    /// dimension. One embedding model per deployment; there is no
    /// mismatch recovery.
    #[error("collection '{name}' holds {existing}-dim vectors but the embedder produces {requested}")]
    DimsMismatch {
        name: String,
        existing: usize,
        requested: usize,
    },

    #[error("unknown collection '{0}'")]
    UnknownCollection(String),

    #[error("vector store backend failure: {0}")]
    Backend(String),
}
