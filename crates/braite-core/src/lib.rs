//! Business logic and port definitions for Braite.
//!
//! This crate defines the traits (LLM provider, retriever, embedder,
//! message transport, task executor) that the infrastructure layer
//! implements, plus the services built on them. It depends only on
//! `braite-types`, never on `braite-infra` or any network crate.

pub mod chat;
pub mod executor;
pub mod llm;
pub mod retrieval;
pub mod session;
pub mod webhook;
