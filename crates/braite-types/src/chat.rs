//! Chat query, answer, turn and retrieval types for Braite.
//!
//! These types model one question/answer exchange: the validated inbound
//! query, the chunks retrieved for it, the turns kept in session history,
//! and the answer returned to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::llm::{Message, MessageRole};

/// Answer text returned when the pipeline cannot produce a completion.
pub const FALLBACK_ANSWER: &str =
    "Maaf, terjadi kesalahan saat memproses pertanyaan Anda. Silakan coba lagi.";

/// Role of a turn stored in session history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl From<TurnRole> for MessageRole {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::User => MessageRole::User,
            TurnRole::Assistant => MessageRole::Assistant,
        }
    }
}

/// One message in a session's history. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        Message {
            role: turn.role.into(),
            content: turn.content.clone(),
        }
    }
}

/// A document chunk returned by similarity search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    /// Document/page label shown to the user as a reference.
    pub source: String,
}

/// A user question bound to a conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatQuery {
    pub query: String,
    pub session_id: String,
}

impl ChatQuery {
    /// Build a validated query.
    pub fn new(
        query: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let q = Self {
            query: query.into(),
            session_id: session_id.into(),
        };
        q.validate()?;
        Ok(q)
    }

    /// Check the request invariant: non-empty query text. Any session key,
    /// including `""`, names a valid session.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.query.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        Ok(())
    }
}

/// The pipeline's answer. `sources` is always present, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl ChatAnswer {
    /// The fixed apology answer with no sources.
    pub fn fallback() -> Self {
        Self {
            answer: FALLBACK_ANSWER.to_string(),
            sources: Vec::new(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.answer == FALLBACK_ANSWER && self.sources.is_empty()
    }
}

/// A chat-platform message that should be answered in the background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Platform conversation identifier (Telegram `chat.id`).
    pub chat_id: String,
    /// Sender display label, used for logging only.
    pub sender: String,
    pub text: String,
}

/// Acknowledgment body returned to the webhook caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAck {
    /// One of `received`, `ignored`, `ok`, `error`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WebhookAck {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
        }
    }
}
