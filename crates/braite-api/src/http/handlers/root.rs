//! Liveness and health endpoints.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

/// GET / - Liveness probe.
pub async fn root() -> Json<Value> {
    Json(json!({
        "status": "online",
        "service": "Braite BPJS Chatbot",
    }))
}

/// GET /health - Version and number of sessions held in memory.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.history().len(),
    }))
}
