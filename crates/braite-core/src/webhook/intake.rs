//! Webhook update classification.
//!
//! Telegram delivers many update kinds (edited messages, member changes,
//! status callbacks). Only `message` updates with a chat id and non-empty
//! text are answered; everything else is acknowledged and dropped.

use serde_json::Value;

use braite_types::chat::InboundEvent;

/// Sender label used when the chat has no username.
pub const UNKNOWN_SENDER: &str = "Unknown";

/// Outcome of inspecting one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intake {
    /// Not a message update (or no usable chat id).
    Ignored,
    /// A message without text (sticker, photo, empty string).
    Empty,
    /// A message that should be answered.
    Dispatch(InboundEvent),
}

impl Intake {
    /// Acknowledgment status reported to the platform.
    pub fn status(&self) -> &'static str {
        match self {
            Intake::Ignored => "ignored",
            Intake::Empty => "ok",
            Intake::Dispatch(_) => "received",
        }
    }
}

/// Classify a raw update payload.
pub fn classify(payload: &Value) -> Intake {
    let Some(message) = payload.get("message").filter(|m| m.is_object()) else {
        return Intake::Ignored;
    };

    let Some(chat) = message.get("chat") else {
        return Intake::Ignored;
    };
    let chat_id = match chat.get("id") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => return Intake::Ignored,
    };

    let text = message.get("text").and_then(Value::as_str).unwrap_or_default();
    if text.is_empty() {
        return Intake::Empty;
    }

    let sender = chat
        .get("username")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_SENDER)
        .to_string();

    Intake::Dispatch(InboundEvent {
        chat_id,
        sender,
        text: text.to_string(),
    })
}
