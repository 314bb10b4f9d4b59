//! Chroma vector store retriever (HTTP API v2).
//!
//! The collection is addressed by name in config; Chroma's query endpoint
//! wants its id, which is looked up on first use and cached.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::OnceCell;

use braite_core::retrieval::embedder::Embedder;
use braite_core::retrieval::retriever::Retriever;
use braite_types::chat::RetrievedChunk;
use braite_types::config::RetrievalConfig;
use braite_types::error::RetrievalError;

/// Label used when a chunk carries no usable `source` metadata.
pub const UNKNOWN_SOURCE: &str = "unknown";

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    id: String,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query_embeddings: Vec<Vec<f32>>,
    n_results: usize,
    include: &'a [&'a str],
}

/// Column-oriented query result: one inner list per query embedding.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<Map<String, Value>>>>>,
}

/// [`Retriever`] backed by a Chroma collection and a remote embedder.
pub struct ChromaRetriever<E: Embedder> {
    client: reqwest::Client,
    embedder: E,
    base_url: String,
    tenant: String,
    database: String,
    collection: String,
    collection_id: OnceCell<String>,
}

impl<E: Embedder> ChromaRetriever<E> {
    pub fn new(config: &RetrievalConfig, embedder: E, timeout: Duration) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RetrievalError::Request(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            embedder,
            base_url: config.chroma_url.trim_end_matches('/').to_string(),
            tenant: config.tenant.clone(),
            database: config.database.clone(),
            collection: config.collection.clone(),
            collection_id: OnceCell::new(),
        })
    }

    fn collections_url(&self) -> String {
        format!(
            "{}/api/v2/tenants/{}/databases/{}/collections",
            self.base_url, self.tenant, self.database
        )
    }

    async fn collection_id(&self) -> Result<&str, RetrievalError> {
        let id = self
            .collection_id
            .get_or_try_init(|| async {
                let url = format!("{}/{}", self.collections_url(), self.collection);
                let response = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| RetrievalError::Request(e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(RetrievalError::Request(format!(
                        "collection '{}' lookup failed (HTTP {status}): {body}",
                        self.collection
                    )));
                }

                let info: CollectionInfo = response
                    .json()
                    .await
                    .map_err(|e| RetrievalError::Deserialization(e.to_string()))?;
                tracing::debug!(collection = %self.collection, id = %info.id, "resolved Chroma collection");
                Ok(info.id)
            })
            .await?;
        Ok(id.as_str())
    }
}

impl<E: Embedder> Retriever for ChromaRetriever<E> {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let embedding = self
            .embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::Embedding("embedder returned no vector".to_string()))?;

        let collection_id = self.collection_id().await?;
        let url = format!("{}/{}/query", self.collections_url(), collection_id);

        let response = self
            .client
            .post(&url)
            .json(&QueryRequest {
                query_embeddings: vec![embedding],
                n_results: k,
                include: &["documents", "metadatas"],
            })
            .send()
            .await
            .map_err(|e| RetrievalError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Request(format!("query failed (HTTP {status}): {body}")));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::Deserialization(e.to_string()))?;

        Ok(into_chunks(parsed, k))
    }
}

/// Flatten the first query's column lists into chunks, dropping rows
/// without document text.
fn into_chunks(response: QueryResponse, k: usize) -> Vec<RetrievedChunk> {
    let documents = response
        .documents
        .and_then(|d| d.into_iter().next())
        .unwrap_or_default();
    let mut metadatas = response
        .metadatas
        .and_then(|m| m.into_iter().next())
        .unwrap_or_default()
        .into_iter();

    documents
        .into_iter()
        .map(|doc| (doc, metadatas.next().flatten()))
        .filter_map(|(doc, meta)| {
            doc.map(|text| RetrievedChunk {
                text,
                source: source_label(meta.as_ref()),
            })
        })
        .take(k)
        .collect()
}

/// Build the reference label for a chunk: the source file name, plus the
/// 1-based page when the metadata carries a numeric 0-based `page`.
pub fn source_label(metadata: Option<&Map<String, Value>>) -> String {
    let Some(meta) = metadata else {
        return UNKNOWN_SOURCE.to_string();
    };

    let name = meta
        .get("source")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Path::new(s)
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| s.to_string())
        });

    let Some(name) = name else {
        return UNKNOWN_SOURCE.to_string();
    };

    match meta.get("page").and_then(Value::as_u64) {
        Some(page) => format!("{name} (hal. {})", page + 1),
        None => name,
    }
}
