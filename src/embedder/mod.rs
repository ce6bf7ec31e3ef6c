/// Embedder trait and shared error type for text embedding.
pub mod mock;
pub mod openai;

use thiserror::Error;

/// Errors that can occur while talking to an embedding provider.
#[derive(Error, Debug)]
pub enum EmbedderError {
    #[error("embedding request failed: {0}")]
    RequestFailed(String),

    #[error("embedding provider returned status {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("malformed embedding response: {0}")]
    InvalidResponse(String),
}

/// Trait for text embedding implementations.
///
/// All implementations must be `Send + Sync` so they can be shared
/// behind `Arc` if needed.
pub trait Embedder: Send + Sync {
    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError>;

    /// Embed multiple text strings into vectors, one per input, in order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError>;

    /// Return the dimensionality of the embedding vectors.
    fn dimensions(&self) -> usize;
}
