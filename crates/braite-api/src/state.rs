//! Application state wiring all services together.
//!
//! AppState holds the pipeline, the history store, the background executor
//! and (when Telegram is enabled) the webhook dispatcher, pinned to the
//! concrete infra adapters.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use braite_core::chat::{GenerationPipeline, PipelineSettings};
use braite_core::executor::{TaskExecutor, TokioTaskExecutor};
use braite_core::retrieval::box_retriever::BoxRetriever;
use braite_core::session::SessionHistoryStore;
use braite_core::webhook::{DispatchSettings, WebhookDispatcher};
use braite_infra::config::resolve_secret;
use braite_infra::llm::create_provider;
use braite_infra::prompt::load_prompt_template;
use braite_infra::retrieval::{ChromaRetriever, OpenAiCompatibleEmbedder};
use braite_infra::telegram::TelegramTransport;
use braite_types::config::AppConfig;

/// Webhook dispatcher pinned to the Telegram transport.
pub type TelegramDispatcher = WebhookDispatcher<TelegramTransport>;

/// Shared application state used by the REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: Arc<GenerationPipeline>,
    pub executor: TokioTaskExecutor,
    /// `None` when Telegram is disabled in config.
    pub telegram: Option<Arc<TelegramDispatcher>>,
}

impl AppState {
    /// Initialize the application state: resolve secrets, wire adapters.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let pipeline = build_pipeline(&config).await?;
        let executor = TokioTaskExecutor::new();

        let telegram = if config.telegram.enabled {
            let token = resolve_secret(&config.telegram.token_env)?;
            let transport = TelegramTransport::from_config(&config.telegram, token)?;
            let dispatcher = WebhookDispatcher::new(
                Arc::clone(&pipeline),
                Arc::new(transport),
                Arc::new(executor.clone()) as Arc<dyn TaskExecutor>,
                DispatchSettings::from_config(&config.telegram),
            );
            tracing::info!("Telegram webhook enabled");
            Some(Arc::new(dispatcher))
        } else {
            tracing::info!("Telegram webhook disabled");
            None
        };

        Ok(Self::from_parts(config, pipeline, executor, telegram))
    }

    pub fn from_parts(
        config: AppConfig,
        pipeline: Arc<GenerationPipeline>,
        executor: TokioTaskExecutor,
        telegram: Option<Arc<TelegramDispatcher>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            pipeline,
            executor,
            telegram,
        }
    }

    pub fn history(&self) -> &Arc<SessionHistoryStore> {
        self.pipeline.history()
    }
}

/// Build the generation pipeline from config.
///
/// Fails when the LLM API key is missing or an HTTP client cannot be built.
/// A missing or broken prompt file only falls back to the built-in prompt.
pub async fn build_pipeline(config: &AppConfig) -> anyhow::Result<Arc<GenerationPipeline>> {
    config.validate()?;

    let api_key = resolve_secret(&config.llm.api_key_env)?;
    let llm = create_provider(&config.llm, api_key.clone())?;

    let embedder = OpenAiCompatibleEmbedder::new(
        &config.llm.base_url,
        api_key,
        &config.retrieval.embedding_model,
        Duration::from_secs(config.llm.timeout_secs),
    )?;
    let retriever = ChromaRetriever::new(
        &config.retrieval,
        embedder,
        Duration::from_secs(config.llm.timeout_secs),
    )?;

    let template = load_prompt_template(Path::new(&config.prompt.template_path)).await;

    Ok(Arc::new(GenerationPipeline::new(
        llm,
        BoxRetriever::new(retriever),
        Arc::new(SessionHistoryStore::new()),
        template,
        PipelineSettings::from_config(&config.llm, &config.retrieval),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use braite_types::error::ConfigError;

    #[tokio::test]
    async fn build_pipeline_requires_api_key() {
        let mut config = AppConfig::default();
        config.llm.api_key_env = "BRAITE_TEST_KEY_THAT_IS_NEVER_SET".to_string();

        let err = build_pipeline(&config).await.err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingSecret(name)) if name == "BRAITE_TEST_KEY_THAT_IS_NEVER_SET"
        ));
    }
}
