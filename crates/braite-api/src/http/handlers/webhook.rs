//! Telegram webhook receiver.
//!
//! Always answers HTTP 200 with a small status body. Accepted messages are
//! answered later by a background job; this handler never waits for it.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde_json::Value;
use subtle::ConstantTimeEq;

use braite_types::chat::WebhookAck;

use crate::state::AppState;

/// Header Telegram sets to the `secret_token` given to `setWebhook`.
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// POST /webhook/telegram - Receive a Telegram update.
pub async fn telegram_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<WebhookAck> {
    let Some(dispatcher) = state.telegram.as_ref() else {
        tracing::debug!("Telegram update received while Telegram is disabled");
        return Json(WebhookAck::new("ignored"));
    };

    if let Some(expected) = state.config.telegram.webhook_secret.as_deref() {
        let provided = headers
            .get(SECRET_TOKEN_HEADER)
            .map(|v| v.as_bytes())
            .unwrap_or_default();
        if !bool::from(provided.ct_eq(expected.as_bytes())) {
            tracing::warn!("Telegram update with missing or wrong secret token");
            return Json(WebhookAck::new("ignored"));
        }
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "Telegram update is not valid JSON");
            return Json(WebhookAck::error("invalid JSON payload"));
        }
    };

    Json(dispatcher.accept(&payload))
}
