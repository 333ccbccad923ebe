//! Generation seam between the answering service and the language model.
//!
//! The model is an opaque collaborator: prompt in, text out, typed error
//! modes. The HTTP gateway in the app crate implements this trait; tests
//! substitute stubs.

use async_trait::async_trait;

use crate::error::GatewayError;

/// A text-generation backend.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a completion for `prompt`.
    ///
    /// Implementations must bound the call with a timeout; a hung model
    /// endpoint is reported as a [`GatewayError`], not awaited forever.
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError>;
}
