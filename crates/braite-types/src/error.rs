use thiserror::Error;

/// Errors raised when validating inbound requests before they reach the pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

/// Errors from the similarity-search capability.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("vector store request failed: {0}")]
    Request(String),

    #[error("unexpected vector store response: {0}")]
    Deserialization(String),
}

/// Errors from the outbound messaging transport.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("delivery timed out after {0}s")]
    Timeout(u64),

    #[error("delivery request failed: {0}")]
    Request(String),

    #[error("platform rejected message (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Errors from handing work to the background executor.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("executor is shutting down, job '{0}' refused")]
    ShuttingDown(String),
}

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing secret: environment variable '{0}' is not set")]
    MissingSecret(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to serialize configuration: {0}")]
    Serialize(String),
}
