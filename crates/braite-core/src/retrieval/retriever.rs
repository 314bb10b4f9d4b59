use braite_types::chat::RetrievedChunk;
use braite_types::error::RetrievalError;

/// Similarity search capability.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in braite-infra.
pub trait Retriever: Send + Sync {
    /// Return up to `k` chunks ranked by relevance, most relevant first.
    fn search(
        &self,
        query: &str,
        k: usize,
    ) -> impl std::future::Future<Output = Result<Vec<RetrievedChunk>, RetrievalError>> + Send;
}
