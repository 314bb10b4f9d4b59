//! Configuration loader for Braite.
//!
//! Reads `braite.toml` and deserializes it into [`AppConfig`]. Falls back to
//! defaults when the file is missing or malformed, then applies `BRAITE_*`
//! environment overrides. Secrets (API key, bot token) never live in the
//! file: the config names the environment variable that holds each one.

use std::path::Path;

use secrecy::SecretString;

use braite_types::config::AppConfig;
use braite_types::error::ConfigError;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "braite.toml";

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and
///   returns the default.
///
/// Environment overrides are applied in both cases.
pub async fn load_config(path: &Path) -> AppConfig {
    let mut config = read_config_file(path).await;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

async fn read_config_file(path: &Path) -> AppConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            AppConfig::default()
        }
    }
}

/// Apply `BRAITE_*` overrides read through `lookup`.
///
/// Unparseable values are logged and skipped.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("BRAITE_HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("BRAITE_PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(_) => tracing::warn!(value = %port, "ignoring invalid BRAITE_PORT"),
        }
    }
    if let Some(model) = lookup("BRAITE_LLM_MODEL") {
        config.llm.model = model;
    }
    if let Some(url) = lookup("BRAITE_CHROMA_URL") {
        config.retrieval.chroma_url = url;
    }
    if let Some(path) = lookup("BRAITE_PROMPT_PATH") {
        config.prompt.template_path = path;
    }
}

/// Read a required secret from the environment variable `name`.
pub fn resolve_secret(name: &str) -> Result<SecretString, ConfigError> {
    secret_from(name, |key| std::env::var(key).ok())
}

fn secret_from<F>(name: &str, lookup: F) -> Result<SecretString, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(SecretString::from(value)),
        _ => Err(ConfigError::MissingSecret(name.to_string())),
    }
}

/// Render the effective configuration as TOML with secrets redacted.
pub fn render_config(config: &AppConfig) -> Result<String, ConfigError> {
    let mut shown = config.clone();
    if shown.telegram.webhook_secret.is_some() {
        shown.telegram.webhook_secret = Some("<redacted>".to_string());
    }
    toml::to_string_pretty(&shown).map_err(|e| ConfigError::Serialize(e.to_string()))
}
