//! Embedder trait for text-to-vector conversion.
//!
//! Implementations (e.g., Gemini embeddings through the OpenAI-compatible
//! endpoint) live in braite-infra.

use braite_types::error::RetrievalError;

/// Trait for converting text into embedding vectors.
pub trait Embedder: Send + Sync {
    /// Embed one or more texts. Returns one vector per input text.
    fn embed(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>, RetrievalError>> + Send;

    /// The model name used for embeddings (e.g., "text-embedding-004").
    fn model_name(&self) -> &str;
}
