//! Webhook dispatcher.
//!
//! Acknowledges every update synchronously and answers accepted messages in
//! a background job: typing indicator, pipeline turn, answer delivery, then
//! an optional references block. A job that fails or panics falls back to
//! a best-effort "system busy" message; nothing escapes to the HTTP exchange
//! that created it.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use braite_types::chat::{ChatQuery, InboundEvent, WebhookAck};
use braite_types::config::TelegramConfig;
use braite_types::error::{DeliveryError, DispatchError};

use crate::chat::GenerationPipeline;
use crate::executor::TaskExecutor;

use super::intake::{Intake, classify};
use super::transport::MessageTransport;

/// Message sent when a background reply could not be completed.
pub const BUSY_MESSAGE: &str = "Maaf, sistem sedang sibuk. Silakan coba lagi.";

/// Heading of the references message sent after an answer.
pub const SOURCES_HEADING: &str = "\n📚 *Sumber Referensi:*\n";

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Prefix applied to chat ids to form session keys.
    pub session_prefix: String,
    pub send_typing: bool,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from_config(&TelegramConfig::default())
    }
}

impl DispatchSettings {
    pub fn from_config(config: &TelegramConfig) -> Self {
        Self {
            session_prefix: config.session_prefix.clone(),
            send_typing: config.send_typing,
        }
    }

    pub fn session_key(&self, chat_id: &str) -> String {
        format!("{}{}", self.session_prefix, chat_id)
    }
}

/// Format sources as a bulleted references block, or `None` when empty.
pub fn format_sources(sources: &[String]) -> Option<String> {
    if sources.is_empty() {
        return None;
    }
    let lines: Vec<String> = sources.iter().map(|s| format!("• {s}")).collect();
    Some(format!("{SOURCES_HEADING}{}", lines.join("\n")))
}

/// Accepts webhook updates and schedules replies.
pub struct WebhookDispatcher<T: MessageTransport> {
    pipeline: Arc<GenerationPipeline>,
    transport: Arc<T>,
    executor: Arc<dyn TaskExecutor>,
    settings: DispatchSettings,
}

impl<T: MessageTransport> WebhookDispatcher<T> {
    pub fn new(
        pipeline: Arc<GenerationPipeline>,
        transport: Arc<T>,
        executor: Arc<dyn TaskExecutor>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            pipeline,
            transport,
            executor,
            settings,
        }
    }

    /// Classify `payload` and, for answerable messages, schedule a reply.
    ///
    /// Returns immediately; the acknowledgment never depends on the reply.
    pub fn accept(&self, payload: &Value) -> WebhookAck {
        match classify(payload) {
            Intake::Dispatch(event) => match self.dispatch(event) {
                Ok(_) => WebhookAck::new("received"),
                Err(e) => {
                    error!(error = %e, "failed to schedule webhook reply");
                    WebhookAck::error(e.to_string())
                }
            },
            other => WebhookAck::new(other.status()),
        }
    }

    /// Hand a reply job for `event` to the executor without awaiting it.
    pub fn dispatch(&self, event: InboundEvent) -> Result<Uuid, DispatchError> {
        let job_id = Uuid::now_v7();
        let job = ReplyJob {
            id: job_id,
            session_key: self.settings.session_key(&event.chat_id),
            send_typing: self.settings.send_typing,
            event,
            pipeline: Arc::clone(&self.pipeline),
            transport: Arc::clone(&self.transport),
        };
        self.executor
            .submit(&format!("telegram-reply-{job_id}"), Box::pin(job.run()))?;
        Ok(job_id)
    }
}

/// One background reply, owning everything it needs.
struct ReplyJob<T: MessageTransport> {
    id: Uuid,
    session_key: String,
    send_typing: bool,
    event: InboundEvent,
    pipeline: Arc<GenerationPipeline>,
    transport: Arc<T>,
}

impl<T: MessageTransport> ReplyJob<T> {
    async fn run(self) {
        let start = Instant::now();
        let preview: String = self.event.text.chars().take(30).collect();
        info!(
            job_id = %self.id,
            chat_id = %self.event.chat_id,
            sender = %self.event.sender,
            text = %preview,
            "processing webhook message"
        );

        let outcome = AssertUnwindSafe(self.reply()).catch_unwind().await;
        let failure = match outcome {
            Ok(Ok(())) => {
                info!(
                    job_id = %self.id,
                    sender = %self.event.sender,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "webhook reply finished"
                );
                return;
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => "reply job panicked".to_string(),
        };

        error!(job_id = %self.id, chat_id = %self.event.chat_id, error = %failure, "webhook reply failed");
        if let Err(e) = self.transport.deliver(&self.event.chat_id, BUSY_MESSAGE).await {
            error!(job_id = %self.id, error = %e, "failed to deliver busy message");
        }
    }

    async fn reply(&self) -> Result<(), ReplyError> {
        let chat_id = &self.event.chat_id;

        if self.send_typing {
            if let Err(e) = self.transport.send_typing(chat_id).await {
                warn!(job_id = %self.id, error = %e, "typing indicator failed");
            }
        }

        let query = ChatQuery::new(self.event.text.clone(), self.session_key.clone())
            .map_err(|e| ReplyError::Invalid(e.to_string()))?;
        let answer = self.pipeline.generate(&query).await;

        self.transport
            .deliver(chat_id, &answer.answer)
            .await
            .map_err(ReplyError::Delivery)?;

        if let Some(block) = format_sources(&answer.sources) {
            if let Err(e) = self.transport.deliver(chat_id, &block).await {
                warn!(job_id = %self.id, error = %e, "failed to deliver sources");
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
enum ReplyError {
    #[error("invalid inbound message: {0}")]
    Invalid(String),

    #[error("answer delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}
