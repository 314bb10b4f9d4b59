//! Synchronous chat endpoint.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use braite_types::chat::{ChatAnswer, ChatQuery};

use crate::http::error::AppError;
use crate::state::AppState;

/// POST /chat - Answer one question within a session.
///
/// Invalid bodies are rejected with 400 before the pipeline runs. Pipeline
/// failures surface as the fallback answer, never as an HTTP error.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatQuery>, JsonRejection>,
) -> Result<Json<ChatAnswer>, AppError> {
    let Json(query) = payload?;
    query.validate()?;

    let start = Instant::now();
    let answer = state.pipeline.generate(&query).await;

    tracing::info!(
        session_id = %query.session_id,
        sources = answer.sources.len(),
        fallback = answer.is_fallback(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "chat answered"
    );

    Ok(Json(answer))
}
