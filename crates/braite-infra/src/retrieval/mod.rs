//! Similarity-search adapters.
//!
//! [`OpenAiCompatibleEmbedder`] turns text into vectors through the
//! `/embeddings` endpoint, and [`ChromaRetriever`] queries a Chroma
//! collection with those vectors.

pub mod chroma;
pub mod embedder;

pub use chroma::ChromaRetriever;
pub use embedder::OpenAiCompatibleEmbedder;
