//! Document upload and listing endpoints

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::blob_path;
use crate::server::extract::UserId;
use crate::server::state::AppState;
use crate::types::{
    Document, DocumentChunk, FileType, IngestRequest, UploadMetadata, UploadResponse,
};

/// MIME type reported by clients that don't know better
const OCTET_STREAM: &str = "application/octet-stream";

/// POST /api/documents - Upload a file and process it
pub async fn upload_document(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::validation(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::validation("File field has no filename"))?;
        let declared = field.content_type().map(|s| s.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::validation(format!("Failed to read file: {}", e)))?;

        upload = Some((filename, declared, data));
        break;
    }

    let (filename, declared, data) =
        upload.ok_or_else(|| Error::validation("Missing 'file' field"))?;

    let mime_type = resolve_mime(declared.as_deref(), &filename);
    if !FileType::is_uploadable(&mime_type) {
        return Err(Error::validation(format!(
            "Unsupported file type: {}",
            mime_type
        )));
    }

    let max_size = state.config().limits.max_file_size;
    if data.len() as u64 > max_size {
        return Err(Error::validation(format!(
            "File too large: {} bytes (limit {} bytes)",
            data.len(),
            max_size
        )));
    }

    let document_id = Uuid::new_v4();
    let storage_path = blob_path(&user_id, &document_id, &filename);
    tracing::info!(
        "Uploading {} ({}, {} bytes) to {}",
        filename,
        mime_type,
        data.len(),
        storage_path
    );

    state.blobs().put(&storage_path, &data).await?;

    let mut document = Document::new(
        user_id,
        filename.clone(),
        mime_type.clone(),
        data.len() as u64,
        storage_path.clone(),
    );
    document.id = document_id;
    document.metadata.upload = Some(UploadMetadata {
        original_name: filename.clone(),
        content_hash: hex::encode(Sha256::digest(&data)),
        uploaded_at: Utc::now(),
    });
    state.records().create_document(&document).await?;

    let ingestion = state
        .pipeline()
        .ingest(
            user_id,
            &IngestRequest {
                document_id,
                file_path: storage_path,
                file_name: filename,
                file_type: mime_type,
            },
        )
        .await?;

    let document = state
        .records()
        .get_document(user_id, document_id)
        .await?
        .ok_or_else(|| Error::not_found("Document", document_id))?;

    Ok(Json(UploadResponse {
        document,
        ingestion,
    }))
}

/// GET /api/documents - The caller's documents, most recently updated first
pub async fn list_documents(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Json<Vec<Document>>> {
    let documents = state.records().list_documents(user_id).await?;
    Ok(Json(documents))
}

/// GET /api/documents/:id - Get document details
pub async fn get_document(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(id): Path<Uuid>,
) -> Result<Json<Document>> {
    let document = state
        .records()
        .get_document(user_id, id)
        .await?
        .ok_or_else(|| Error::not_found("Document", id))?;
    Ok(Json(document))
}

/// GET /api/documents/:id/chunks - Chunks of a document by ordinal
pub async fn list_chunks(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<DocumentChunk>>> {
    let document = state
        .records()
        .get_document(user_id, id)
        .await?
        .ok_or_else(|| Error::not_found("Document", id))?;

    let chunks = state.records().list_chunks(document.id).await?;
    Ok(Json(chunks))
}

/// Declared content type, else a guess from the filename extension
fn resolve_mime(declared: Option<&str>, filename: &str) -> String {
    match declared {
        Some(mime) if !mime.trim().is_empty() && !mime.eq_ignore_ascii_case(OCTET_STREAM) => {
            mime.to_string()
        }
        _ => mime_guess::from_path(filename)
            .first_raw()
            .unwrap_or(OCTET_STREAM)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::document::{DOCX_MIME, PPTX_MIME};

    #[test]
    fn test_resolve_mime_prefers_declared() {
        assert_eq!(resolve_mime(Some("application/pdf"), "notes.txt"), "application/pdf");
    }

    #[test]
    fn test_resolve_mime_guesses_from_extension() {
        assert_eq!(resolve_mime(None, "notes.txt"), "text/plain");
        assert_eq!(resolve_mime(Some(OCTET_STREAM), "deck.pptx"), PPTX_MIME);
        assert_eq!(resolve_mime(Some(""), "report.docx"), DOCX_MIME);
        assert_eq!(resolve_mime(None, "mystery"), OCTET_STREAM);
    }
}
