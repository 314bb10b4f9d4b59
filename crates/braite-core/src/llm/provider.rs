//! LlmProvider trait definition.
//!
//! This is the "complete text given a prompt" capability. Uses RPITIT for
//! `complete`; `BoxLlmProvider` provides the object-safe form.

use braite_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for LLM provider backends (Gemini, OpenAI, ...).
///
/// Implementations live in braite-infra (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
