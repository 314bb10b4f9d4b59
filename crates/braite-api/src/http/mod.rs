//! HTTP layer for Braite.
//!
//! Axum router with the health, chat and Telegram webhook endpoints, CORS,
//! request tracing and timing middleware.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
