//! Conversation listing endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::extract::UserId;
use crate::server::state::AppState;
use crate::types::{Conversation, Message};

/// GET /api/conversations - The caller's conversations, most recent first
pub async fn list_conversations(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Json<Vec<Conversation>>> {
    let conversations = state.records().list_conversations(user_id).await?;
    Ok(Json(conversations))
}

/// GET /api/conversations/:id/messages - Messages in creation order
pub async fn list_messages(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Message>>> {
    let conversation = state
        .records()
        .get_conversation(user_id, id)
        .await?
        .ok_or_else(|| Error::not_found("Conversation", id))?;

    let messages = state.records().list_messages(conversation.id).await?;
    Ok(Json(messages))
}
