//! Similarity search over document chunks.
//!
//! - `Retriever`: query text + k -> ordered chunks (adapter-defined ranking)
//! - `Embedder`: text -> vectors, used by vector-store backed retrievers
//! - `BoxRetriever`: object-safe wrapper for dynamic dispatch

pub mod box_retriever;
pub mod embedder;
pub mod retriever;

use braite_types::chat::RetrievedChunk;

/// Separator placed between chunk texts in the prompt context.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Join chunk texts in retrieval order. Duplicates are kept.
pub fn format_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Source labels in retrieval order.
pub fn source_labels(chunks: &[RetrievedChunk]) -> Vec<String> {
    chunks.iter().map(|c| c.source.clone()).collect()
}
