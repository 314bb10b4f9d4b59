//! Generation pipeline: retrieve, assemble, complete, remember.
//!
//! `generate` never fails. Completion errors, timeouts and empty responses
//! are logged and turned into [`ChatAnswer::fallback`], and the session
//! history is left untouched so a failed turn never pollutes later prompts.
//! A failed retrieval only degrades the answer: it is logged and treated as
//! "no context".

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use braite_types::chat::{ChatAnswer, ChatQuery, RetrievedChunk, Turn};
use braite_types::config::{LlmConfig, RetrievalConfig};
use braite_types::llm::LlmError;
use braite_types::prompt::PromptTemplate;

use crate::chat::prompt::build_completion_request;
use crate::llm::box_provider::BoxLlmProvider;
use crate::retrieval::box_retriever::BoxRetriever;
use crate::retrieval::{format_context, source_labels};
use crate::session::SessionHistoryStore;

/// Tunables for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    /// Chunks retrieved per query.
    pub top_k: usize,
    pub completion_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&LlmConfig::default(), &RetrievalConfig::default())
    }
}

impl PipelineSettings {
    pub fn from_config(llm: &LlmConfig, retrieval: &RetrievalConfig) -> Self {
        Self {
            model: llm.model.clone(),
            max_tokens: llm.max_tokens,
            temperature: llm.temperature,
            top_k: retrieval.top_k,
            completion_timeout: Duration::from_secs(llm.timeout_secs),
        }
    }
}

/// Session-scoped retrieval-augmented generation.
pub struct GenerationPipeline {
    llm: BoxLlmProvider,
    retriever: BoxRetriever,
    history: Arc<SessionHistoryStore>,
    template: PromptTemplate,
    settings: PipelineSettings,
}

impl GenerationPipeline {
    pub fn new(
        llm: BoxLlmProvider,
        retriever: BoxRetriever,
        history: Arc<SessionHistoryStore>,
        template: PromptTemplate,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            llm,
            retriever,
            history,
            template,
            settings,
        }
    }

    /// The store this pipeline appends to.
    pub fn history(&self) -> &Arc<SessionHistoryStore> {
        &self.history
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Answer one query. Always returns a well-formed answer.
    pub async fn generate(&self, query: &ChatQuery) -> ChatAnswer {
        let start = Instant::now();
        match self.try_generate(query).await {
            Ok(answer) => {
                info!(
                    session_id = %query.session_id,
                    sources = answer.sources.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "answer generated"
                );
                answer
            }
            Err(e) => {
                error!(
                    session_id = %query.session_id,
                    provider = self.llm.name(),
                    error = %e,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "generation failed, returning fallback answer"
                );
                ChatAnswer::fallback()
            }
        }
    }

    async fn try_generate(&self, query: &ChatQuery) -> Result<ChatAnswer, LlmError> {
        let chunks = self.retrieve(&query.query).await;
        let context = format_context(&chunks);

        let session = self.history.get_or_create(&query.session_id);
        let history = session.snapshot();

        let request = build_completion_request(
            &self.template,
            &context,
            &history,
            &query.query,
            &self.settings,
        );
        debug!(
            session_id = %query.session_id,
            history_turns = history.len(),
            context_chars = context.len(),
            "sending completion request"
        );

        let timeout = self.settings.completion_timeout;
        let response = tokio::time::timeout(timeout, self.llm.complete(&request))
            .await
            .map_err(|_| LlmError::Timeout(timeout.as_secs()))??;

        if response.content.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        session.append_exchange(
            Turn::user(query.query.clone()),
            Turn::assistant(response.content.clone()),
        );

        Ok(ChatAnswer {
            answer: response.content,
            sources: source_labels(&chunks),
        })
    }

    async fn retrieve(&self, query: &str) -> Vec<RetrievedChunk> {
        match self.retriever.search(query, self.settings.top_k).await {
            Ok(chunks) => {
                debug!(found = chunks.len(), "retrieval complete");
                chunks
            }
            Err(e) => {
                warn!(error = %e, "retrieval failed, continuing without context");
                Vec::new()
            }
        }
    }
}
