//! Typed system-instruction template.
//!
//! Loaded once at startup from a YAML file (see `braite-infra::prompt`).
//! The instruction may carry a `{context}` placeholder; when it does not,
//! retrieved context is appended under a `Konteks:` heading.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Placeholder replaced with the retrieved context string.
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Generic instruction used when the template file cannot be loaded.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "Anda adalah asisten virtual yang membantu \
menjawab pertanyaan seputar BPJS Kesehatan. Jawab dengan bahasa Indonesia yang sopan dan \
jelas, gunakan hanya informasi dari konteks yang diberikan, dan katakan bahwa Anda tidak \
tahu jika jawabannya tidak ada di konteks.";

/// The system instruction prepended to every completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    #[serde(alias = "prompts")]
    pub system: String,
}

impl PromptTemplate {
    /// Build a template, rejecting a blank instruction.
    pub fn new(system: impl Into<String>) -> Result<Self, ConfigError> {
        let template = Self {
            system: system.into(),
        };
        template.validate()?;
        Ok(template)
    }

    pub fn fallback() -> Self {
        Self {
            system: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.system.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "prompt template instruction must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Combine the instruction with the retrieved context.
    pub fn render(&self, context: &str) -> String {
        if self.system.contains(CONTEXT_PLACEHOLDER) {
            self.system.replace(CONTEXT_PLACEHOLDER, context)
        } else {
            format!("{}\n\nKonteks:\n{}", self.system.trim_end(), context)
        }
    }
}
