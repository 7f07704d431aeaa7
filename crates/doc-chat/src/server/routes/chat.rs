//! Chat endpoint

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::error::{Error, Result};
use crate::server::extract::UserId;
use crate::server::state::AppState;
use crate::types::{ChatRequest, ChatResponse};

/// POST /api/chat - Answer a message using the user's documents as context
pub async fn chat(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let Json(request) = payload.map_err(|e| Error::validation(e.body_text()))?;

    tracing::info!(
        "Chat request from {} ({} attached files)",
        user_id,
        request.files.len()
    );

    let response = state.chat().respond(user_id, request).await?;
    Ok(Json(response))
}
