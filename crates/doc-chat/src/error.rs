//! Error types for the document chat service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for doc-chat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Service errors
///
/// Extraction problems are deliberately absent: extractors degrade to
/// placeholder text instead of failing.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Client-facing rejection (bad MIME type, oversized file, empty message)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Missing or malformed caller identity
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Record not found (or not owned by the caller)
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Blob storage failure (download/upload)
    #[error("Storage error: {0}")]
    BlobStorage(String),

    /// Record store failure
    #[error("Database error: {0}")]
    Database(String),

    /// Completion backend failure
    #[error("LLM error: {0}")]
    Llm(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not-found error
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Create a blob storage error
    pub fn blob_storage(message: impl Into<String>) -> Self {
        Self::BlobStorage(message.into())
    }

    /// Create a database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Llm(_) | Error::Http(_) => StatusCode::BAD_GATEWAY,
            Error::Config(_)
            | Error::BlobStorage(_)
            | Error::Database(_)
            | Error::Io(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::validation("too big").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::not_found("Document", "abc").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(Error::blob_storage("gone").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(Error::llm("down").status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_not_found_message() {
        let err = Error::not_found("Conversation", "42");
        assert_eq!(err.to_string(), "Conversation not found: 42");
    }
}
