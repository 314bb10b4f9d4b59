//! LLM provider implementations.
//!
//! Contains the concrete [`LlmProvider`](braite_core::llm::provider::LlmProvider)
//! used by Braite and a factory ([`create_provider`]) that builds it from the
//! `[llm]` config section.

pub mod openai_compat;

use secrecy::SecretString;

use braite_core::llm::box_provider::BoxLlmProvider;
use braite_types::config::LlmConfig;
use braite_types::llm::LlmError;

use self::openai_compat::OpenAiCompatibleProvider;

/// Create a [`BoxLlmProvider`] from the `[llm]` section and a resolved key.
pub fn create_provider(config: &LlmConfig, api_key: SecretString) -> Result<BoxLlmProvider, LlmError> {
    let provider = OpenAiCompatibleProvider::from_config(config, api_key)?;
    tracing::debug!(base_url = %config.base_url, model = %config.model, "LLM provider created");
    Ok(BoxLlmProvider::new(provider))
}
