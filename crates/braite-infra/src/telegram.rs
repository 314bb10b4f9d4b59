//! Telegram Bot API transport.
//!
//! Implements [`MessageTransport`] with `sendMessage` and `sendChatAction`.
//! Long answers are split at Telegram's 4096-character limit, and a message
//! whose Markdown Telegram cannot parse is resent once as plain text.
//!
//! The bot token is part of every request URL, so it is kept in a
//! [`SecretString`] and URLs are stripped from reqwest errors before they
//! are logged.

use std::future::Future;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use braite_core::webhook::MessageTransport;
use braite_types::config::TelegramConfig;
use braite_types::error::DeliveryError;

/// Maximum characters Telegram accepts in one text message.
pub const MAX_MESSAGE_CHARS: usize = 4096;

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SendChatAction<'a> {
    chat_id: &'a str,
    action: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Transport posting to `{api_base}/bot{token}/{method}`.
pub struct TelegramTransport {
    client: reqwest::Client,
    api_base: String,
    token: SecretString,
    timeout: Duration,
}

impl TelegramTransport {
    pub fn new(
        api_base: impl Into<String>,
        token: SecretString,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| DeliveryError::Request(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
            timeout,
        })
    }

    pub fn from_config(config: &TelegramConfig, token: SecretString) -> Result<Self, DeliveryError> {
        Self::new(
            &config.api_base,
            token,
            Duration::from_secs(config.delivery_timeout_secs),
        )
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token.expose_secret(), method)
    }

    /// POST `body` to a Bot API method, bounded by the delivery timeout.
    async fn call<B: Serialize + Sync>(&self, method: &str, body: &B) -> Result<(), DeliveryError> {
        let request = async {
            let response = self
                .client
                .post(self.method_url(method))
                .json(body)
                .send()
                .await
                .map_err(|e| DeliveryError::Request(e.without_url().to_string()))?;

            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let parsed: Option<ApiResponse> = serde_json::from_str(&text).ok();

            match parsed {
                Some(api) if status.is_success() && api.ok => Ok(()),
                Some(api) => Err(DeliveryError::Rejected {
                    status: status.as_u16(),
                    body: api.description.unwrap_or(text),
                }),
                None => Err(DeliveryError::Rejected {
                    status: status.as_u16(),
                    body: text,
                }),
            }
        };

        bounded(self.timeout, request).await
    }

    async fn send_chunk(&self, chat_id: &str, text: &str) -> Result<(), DeliveryError> {
        let markdown = SendMessage {
            chat_id,
            text,
            parse_mode: Some("Markdown"),
        };
        match self.call("sendMessage", &markdown).await {
            Err(DeliveryError::Rejected { status: 400, body }) if is_entity_error(&body) => {
                tracing::debug!(chat_id, "Markdown rejected, resending as plain text");
                let plain = SendMessage {
                    chat_id,
                    text,
                    parse_mode: None,
                };
                self.call("sendMessage", &plain).await
            }
            other => other,
        }
    }
}

async fn bounded<F>(timeout: Duration, fut: F) -> Result<(), DeliveryError>
where
    F: Future<Output = Result<(), DeliveryError>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .unwrap_or(Err(DeliveryError::Timeout(timeout.as_secs())))
}

fn is_entity_error(body: &str) -> bool {
    body.contains("can't parse entities")
}

/// Split `text` into pieces of at most `limit` characters, preferring to
/// break after a newline. A zero `limit` leaves the text whole.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if limit == 0 {
        return vec![text.to_string()];
    }
    let mut parts = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let Some((cut, _)) = rest.char_indices().nth(limit) else {
            parts.push(rest.to_string());
            break;
        };
        let head = &rest[..cut];
        let split_at = match head.rfind('\n') {
            Some(nl) if nl > 0 => nl + 1,
            _ => cut,
        };
        parts.push(rest[..split_at].to_string());
        rest = &rest[split_at..];
    }
    parts
}

impl MessageTransport for TelegramTransport {
    async fn deliver(&self, chat_id: &str, text: &str) -> Result<(), DeliveryError> {
        for chunk in split_message(text, MAX_MESSAGE_CHARS) {
            self.send_chunk(chat_id, &chunk).await?;
        }
        Ok(())
    }

    async fn send_typing(&self, chat_id: &str) -> Result<(), DeliveryError> {
        self.call(
            "sendChatAction",
            &SendChatAction {
                chat_id,
                action: "typing",
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "123:test-token";

    fn transport(uri: &str, timeout: Duration) -> TelegramTransport {
        TelegramTransport::new(uri, SecretString::from(TOKEN), timeout).unwrap()
    }

    fn ok() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}}))
    }

    #[test]
    fn test_split_short_message() {
        assert_eq!(split_message("Halo", 10), vec!["Halo"]);
        assert!(split_message("", 10).is_empty());
    }

    #[test]
    fn test_split_prefers_newlines() {
        let parts = split_message("aaaa\nbbbb\ncc", 6);
        assert_eq!(parts, vec!["aaaa\n", "bbbb\n", "cc"]);
    }

    #[test]
    fn test_split_zero_limit_keeps_text_whole() {
        assert_eq!(split_message("Halo\nBudi", 0), vec!["Halo\nBudi"]);
    }

    #[test]
    fn test_split_hard_cut_counts_chars() {
        let parts = split_message("ééééé", 2);
        assert_eq!(parts, vec!["éé", "éé", "é"]);
        assert!(parts.iter().all(|p| p.chars().count() <= 2));
    }

    #[tokio::test]
    async fn test_deliver_uses_markdown() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/sendMessage")))
            .and(body_json(json!({
                "chat_id": "123",
                "text": "Halo *budi*",
                "parse_mode": "Markdown"
            })))
            .respond_with(ok())
            .expect(1)
            .mount(&server)
            .await;

        transport(&server.uri(), Duration::from_secs(5))
            .deliver("123", "Halo *budi*")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_deliver_retries_plain_on_entity_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/sendMessage")))
            .and(body_partial_json(json!({"parse_mode": "Markdown"})))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: can't parse entities: Can't find end of the entity"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/sendMessage")))
            .and(body_json(json!({"chat_id": "123", "text": "a_b"})))
            .respond_with(ok())
            .expect(1)
            .mount(&server)
            .await;

        transport(&server.uri(), Duration::from_secs(5))
            .deliver("123", "a_b")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_deliver_reports_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "ok": false,
                "error_code": 403,
                "description": "Forbidden: bot was blocked by the user"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = transport(&server.uri(), Duration::from_secs(5))
            .deliver("123", "Halo")
            .await
            .unwrap_err();
        match err {
            DeliveryError::Rejected { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("blocked"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_deliver_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ok().set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let err = transport(&server.uri(), Duration::from_millis(100))
            .deliver("123", "Halo")
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_deliver_long_text_sends_several_messages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/sendMessage")))
            .respond_with(ok())
            .expect(2)
            .mount(&server)
            .await;

        let text = "x".repeat(MAX_MESSAGE_CHARS + 10);
        transport(&server.uri(), Duration::from_secs(5))
            .deliver("123", &text)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_send_typing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/sendChatAction")))
            .and(body_json(json!({"chat_id": "42", "action": "typing"})))
            .respond_with(ok())
            .expect(1)
            .mount(&server)
            .await;

        transport(&server.uri(), Duration::from_secs(5))
            .send_typing("42")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_request_error_does_not_leak_token() {
        // nothing listens on port 9
        let err = transport("http://127.0.0.1:9", Duration::from_secs(5))
            .deliver("123", "Halo")
            .await
            .unwrap_err();
        assert!(!err.to_string().contains("test-token"));
    }
}
