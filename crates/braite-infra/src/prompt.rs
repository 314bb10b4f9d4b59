//! System prompt template loader.
//!
//! The template lives in a small YAML file:
//!
//! ```yaml
//! prompts: |
//!   Anda adalah asisten BPJS Kesehatan ...
//!   Konteks:
//!   {context}
//! ```
//!
//! Any failure (missing file, bad YAML, blank instruction) yields
//! [`PromptTemplate::fallback`] so the service always starts.

use std::path::Path;

use braite_types::error::ConfigError;
use braite_types::prompt::PromptTemplate;

/// Load the template at `path`, falling back to the built-in instruction.
pub async fn load_prompt_template(path: &Path) -> PromptTemplate {
    match try_load(path).await {
        Ok(template) => {
            tracing::info!(path = %path.display(), "prompt template loaded");
            template
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "using fallback prompt template");
            PromptTemplate::fallback()
        }
    }
}

async fn try_load(path: &Path) -> Result<PromptTemplate, ConfigError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Invalid(format!("cannot read {}: {e}", path.display())))?;
    parse_prompt_template(&content)
}

/// Parse and validate template YAML.
pub fn parse_prompt_template(content: &str) -> Result<PromptTemplate, ConfigError> {
    let template: PromptTemplate = serde_yaml_ng::from_str(content)
        .map_err(|e| ConfigError::Invalid(format!("malformed prompt template: {e}")))?;
    template.validate()?;
    Ok(template)
}
