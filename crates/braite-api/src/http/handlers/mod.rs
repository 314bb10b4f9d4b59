//! HTTP request handlers.

pub mod chat;
pub mod root;
pub mod webhook;

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures: an echoing LLM, an empty retriever and state builders.

    use std::sync::Arc;
    use std::time::Duration;

    use secrecy::SecretString;

    use braite_core::chat::{GenerationPipeline, PipelineSettings};
    use braite_core::executor::{TaskExecutor, TokioTaskExecutor};
    use braite_core::llm::box_provider::BoxLlmProvider;
    use braite_core::llm::provider::LlmProvider;
    use braite_core::retrieval::box_retriever::BoxRetriever;
    use braite_core::retrieval::retriever::Retriever;
    use braite_core::session::SessionHistoryStore;
    use braite_core::webhook::{DispatchSettings, WebhookDispatcher};
    use braite_infra::telegram::TelegramTransport;
    use braite_types::chat::RetrievedChunk;
    use braite_types::config::AppConfig;
    use braite_types::error::RetrievalError;
    use braite_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason, Usage};
    use braite_types::prompt::PromptTemplate;

    use crate::state::AppState;

    pub const BOT_TOKEN: &str = "1:test";

    /// Replies `jawaban: <last user message>`.
    pub struct EchoLlm;

    impl LlmProvider for EchoLlm {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
            let last = request.messages.last().map(|m| m.content.clone()).unwrap_or_default();
            Ok(CompletionResponse {
                id: "echo-1".to_string(),
                content: format!("jawaban: {last}"),
                model: "echo".to_string(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }
    }

    pub struct OneDoc;

    impl Retriever for OneDoc {
        async fn search(&self, _query: &str, _k: usize) -> Result<Vec<RetrievedChunk>, RetrievalError> {
            Ok(vec![RetrievedChunk {
                text: "Peserta JKN wajib membayar iuran setiap bulan.".to_string(),
                source: "panduan.pdf (hal. 2)".to_string(),
            }])
        }
    }

    pub fn pipeline() -> Arc<GenerationPipeline> {
        Arc::new(GenerationPipeline::new(
            BoxLlmProvider::new(EchoLlm),
            BoxRetriever::new(OneDoc),
            Arc::new(SessionHistoryStore::new()),
            PromptTemplate::fallback(),
            PipelineSettings::default(),
        ))
    }

    /// State with Telegram disabled.
    pub fn state() -> AppState {
        AppState::from_parts(AppConfig::default(), pipeline(), TokioTaskExecutor::new(), None)
    }

    /// State with a Telegram dispatcher posting to `api_base`.
    pub fn state_with_telegram(api_base: &str, webhook_secret: Option<&str>) -> AppState {
        let mut config = AppConfig::default();
        config.telegram.enabled = true;
        config.telegram.api_base = api_base.to_string();
        config.telegram.webhook_secret = webhook_secret.map(str::to_string);

        let pipeline = pipeline();
        let executor = TokioTaskExecutor::new();
        let transport =
            TelegramTransport::new(api_base, SecretString::from(BOT_TOKEN), Duration::from_secs(5))
                .unwrap();
        let dispatcher = WebhookDispatcher::new(
            Arc::clone(&pipeline),
            Arc::new(transport),
            Arc::new(executor.clone()) as Arc<dyn TaskExecutor>,
            DispatchSettings::from_config(&config.telegram),
        );
        AppState::from_parts(config, pipeline, executor, Some(Arc::new(dispatcher)))
    }
}
