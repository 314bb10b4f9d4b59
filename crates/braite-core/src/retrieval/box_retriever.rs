//! BoxRetriever -- object-safe dynamic dispatch wrapper for Retriever.
//!
//! Same blanket-impl pattern as [`crate::llm::box_provider::BoxLlmProvider`].

use std::future::Future;
use std::pin::Pin;

use braite_types::chat::RetrievedChunk;
use braite_types::error::RetrievalError;

use super::retriever::Retriever;

/// Object-safe version of [`Retriever`] with boxed futures.
pub trait RetrieverDyn: Send + Sync {
    fn search_boxed<'a>(
        &'a self,
        query: &'a str,
        k: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RetrievedChunk>, RetrievalError>> + Send + 'a>>;
}

impl<T: Retriever> RetrieverDyn for T {
    fn search_boxed<'a>(
        &'a self,
        query: &'a str,
        k: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RetrievedChunk>, RetrievalError>> + Send + 'a>>
    {
        Box::pin(self.search(query, k))
    }
}

/// Type-erased retriever.
pub struct BoxRetriever {
    inner: Box<dyn RetrieverDyn + Send + Sync>,
}

impl BoxRetriever {
    pub fn new<T: Retriever + 'static>(retriever: T) -> Self {
        Self {
            inner: Box::new(retriever),
        }
    }

    pub async fn search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        self.inner.search_boxed(query, k).await
    }
}
