//! Shared domain types for Braite, the BPJS chatbot engine.
//!
//! This crate contains the data shapes exchanged between layers: chat
//! queries and answers, session turns, retrieved chunks, LLM requests,
//! configuration, the prompt template, and their error types.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod prompt;
