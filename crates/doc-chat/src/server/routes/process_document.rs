//! Document processing endpoint

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::error::{Error, Result};
use crate::server::extract::UserId;
use crate::server::state::AppState;
use crate::types::{IngestRequest, IngestResponse};

/// POST /api/process-document - Extract, store and chunk an uploaded document
pub async fn process_document(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    payload: std::result::Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<IngestResponse>> {
    let Json(request) = payload.map_err(|e| Error::validation(e.body_text()))?;

    tracing::info!(
        "Processing document {} for user {}",
        request.document_id,
        user_id
    );

    let response = state.pipeline().ingest(user_id, &request).await?;
    Ok(Json(response))
}
