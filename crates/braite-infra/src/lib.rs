//! Infrastructure layer for Braite.
//!
//! Contains implementations of the ports defined in `braite-core`: the
//! OpenAI-compatible LLM provider and embedder, the Chroma retriever and the
//! Telegram transport, plus config and prompt-template loading.

pub mod config;
pub mod llm;
pub mod prompt;
pub mod retrieval;
pub mod telegram;
