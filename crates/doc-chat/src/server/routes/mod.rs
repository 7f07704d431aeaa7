//! API routes for the doc-chat server

pub mod chat;
pub mod conversations;
pub mod documents;
pub mod process_document;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Core operations, each with an explicit OPTIONS no-op
        .route(
            "/process-document",
            post(process_document::process_document).options(preflight),
        )
        .route("/chat", post(chat::chat).options(preflight))
        // Documents - upload gets a larger body limit
        .route(
            "/documents",
            get(documents::list_documents).merge(
                post(documents::upload_document).layer(DefaultBodyLimit::max(max_upload_size)),
            ),
        )
        .route("/documents/:id", get(documents::get_document))
        .route("/documents/:id/chunks", get(documents::list_chunks))
        // Conversations
        .route("/conversations", get(conversations::list_conversations))
        .route(
            "/conversations/:id/messages",
            get(conversations::list_messages),
        )
        // Info
        .route("/info", get(info))
}

/// OPTIONS no-op for the core operations
async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "doc-chat",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Document-aware chat with keyword-selected context",
        "endpoints": {
            "POST /api/process-document": "Extract, store and chunk an uploaded document",
            "POST /api/chat": "Ask a question about your documents",
            "POST /api/documents": "Upload a document (multipart 'file' field)",
            "GET /api/documents": "List your documents",
            "GET /api/documents/:id": "Get document details",
            "GET /api/documents/:id/chunks": "List a document's chunks",
            "GET /api/conversations": "List your conversations",
            "GET /api/conversations/:id/messages": "List a conversation's messages"
        },
        "auth": "Requests must carry an x-user-id header (UUID)"
    }))
}
