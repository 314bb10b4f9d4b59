//! Application configuration types for Braite.
//!
//! `AppConfig` represents the top-level `braite.toml`. Every field has a
//! default so an empty or missing file yields a runnable configuration
//! (secrets are resolved separately from the environment).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    pub telegram: TelegramConfig,
    pub prompt: PromptConfig,
}

impl AppConfig {
    /// Reject values that would make the service unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".into()));
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::Invalid("retrieval.top_k must be at least 1".into()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Invalid("llm.timeout_secs must be non-zero".into()));
        }
        if self.telegram.delivery_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "telegram.delivery_timeout_secs must be non-zero".into(),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.model must not be empty".into()));
        }
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Completion capability settings (OpenAI-compatible endpoint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Upper bound for one completion call, in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            temperature: 0.3,
            max_tokens: 2048,
            timeout_secs: 60,
        }
    }
}

/// Similarity-search settings (Chroma + embedding endpoint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub chroma_url: String,
    pub tenant: String,
    pub database: String,
    /// Chroma collection id queried for chunks.
    pub collection: String,
    pub embedding_model: String,
    /// Number of chunks retrieved per query.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chroma_url: "http://localhost:8001".to_string(),
            tenant: "default_tenant".to_string(),
            database: "default_database".to_string(),
            collection: "bpjs_docs".to_string(),
            embedding_model: "text-embedding-004".to_string(),
            top_k: 3,
        }
    }
}

/// Telegram webhook + delivery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub enabled: bool,
    pub api_base: String,
    /// Name of the environment variable holding the bot token.
    pub token_env: String,
    /// Expected `X-Telegram-Bot-Api-Secret-Token` header, if set.
    pub webhook_secret: Option<String>,
    pub delivery_timeout_secs: u64,
    /// Prefix namespacing Telegram chats in the session store.
    pub session_prefix: String,
    pub send_typing: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base: "https://api.telegram.org".to_string(),
            token_env: "TELEGRAM_BOT_TOKEN".to_string(),
            webhook_secret: None,
            delivery_timeout_secs: 10,
            session_prefix: "tg-".to_string(),
            send_typing: true,
        }
    }
}

/// Location of the system-instruction template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub template_path: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template_path: "prompts/system.yaml".to_string(),
        }
    }
}
