//! Document and chunk records with typed processing metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// MIME type of Word documents (.docx)
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
/// MIME type of PowerPoint presentations (.pptx)
pub const PPTX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// MIME types accepted by the upload endpoint
pub const UPLOADABLE_MIME_TYPES: &[&str] = &[
    "text/plain",
    "application/pdf",
    DOCX_MIME,
    PPTX_MIME,
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
];

/// Extraction category of a declared MIME type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// `text/plain`
    Text,
    /// `application/pdf`
    Pdf,
    /// Office Open XML word-processing document
    Docx,
    /// Office Open XML presentation
    Pptx,
    /// Any `image/*`
    Image,
    /// Everything else
    Unsupported,
}

impl FileType {
    /// Classify a declared MIME type.
    ///
    /// Matching ignores case and parameters such as `; charset=utf-8`.
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime_essence(mime);
        match essence.as_str() {
            "text/plain" => Self::Text,
            "application/pdf" => Self::Pdf,
            DOCX_MIME => Self::Docx,
            PPTX_MIME => Self::Pptx,
            other if other.starts_with("image/") => Self::Image,
            _ => Self::Unsupported,
        }
    }

    /// Check whether a MIME type may be uploaded
    pub fn is_uploadable(mime: &str) -> bool {
        let essence = mime_essence(mime);
        UPLOADABLE_MIME_TYPES.contains(&essence.as_str())
    }
}

/// Lower-cased MIME type without parameters
pub fn mime_essence(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Uploaded document with its extracted content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Original filename as uploaded
    pub filename: String,
    /// Declared MIME type
    pub mime_type: String,
    /// File size in bytes
    pub file_size: u64,
    /// Blob storage path of the original bytes
    pub storage_path: String,
    /// Extracted text; `None` until processing succeeds
    pub content: Option<String>,
    /// Upload and processing metadata
    pub metadata: DocumentMetadata,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create a freshly uploaded, unprocessed document
    pub fn new(
        user_id: Uuid,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        file_size: u64,
        storage_path: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            filename: filename.into(),
            mime_type: mime_type.into(),
            file_size,
            storage_path: storage_path.into(),
            content: None,
            metadata: DocumentMetadata::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether extraction completed and content is available
    pub fn is_processed(&self) -> bool {
        matches!(self.metadata.processing, ProcessingState::Processed { .. })
    }
}

/// Metadata attached to a document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentMetadata {
    /// Set when the document came through the upload endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload: Option<UploadMetadata>,
    /// Processing state machine
    #[serde(default)]
    pub processing: ProcessingState,
}

/// Facts recorded at upload time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadMetadata {
    /// Filename supplied by the client
    pub original_name: String,
    /// SHA-256 of the uploaded bytes (hex)
    pub content_hash: String,
    /// Upload timestamp
    pub uploaded_at: DateTime<Utc>,
}

/// Processing state of a document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessingState {
    /// Stored, content not yet extracted
    #[default]
    Uploaded,
    /// Extraction finished (possibly with placeholder text)
    Processed {
        processed_at: DateTime<Utc>,
        /// Whitespace-delimited tokens in the stored text
        word_count: usize,
    },
    /// Infrastructure failure after download
    ProcessingFailed {
        failed_at: DateTime<Utc>,
        processing_error: String,
    },
}

impl ProcessingState {
    /// Successful processing of `text`
    pub fn processed(text: &str) -> Self {
        Self::Processed {
            processed_at: Utc::now(),
            word_count: word_count(text),
        }
    }

    /// Failed processing with the given error message
    pub fn failed(error: impl Into<String>) -> Self {
        Self::ProcessingFailed {
            failed_at: Utc::now(),
            processing_error: error.into(),
        }
    }
}

/// Count whitespace-delimited tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Stored chunk of a document's extracted text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentChunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Parent document ID
    pub document_id: Uuid,
    /// Chunk text
    pub content: String,
    /// Ordinal within the document (0-indexed, contiguous)
    pub chunk_index: u32,
    /// Length of `content` in characters
    pub chunk_size: u32,
}

impl DocumentChunk {
    /// Create a chunk
    pub fn new(document_id: Uuid, content: String, chunk_index: u32) -> Self {
        let chunk_size = content.chars().count() as u32;
        Self {
            id: Uuid::new_v4(),
            document_id,
            content,
            chunk_index,
            chunk_size,
        }
    }

    /// Number chunk texts in order, starting at 0
    pub fn sequence(document_id: Uuid, texts: Vec<String>) -> Vec<Self> {
        texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Self::new(document_id, text, i as u32))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mime() {
        assert_eq!(FileType::from_mime("text/plain"), FileType::Text);
        assert_eq!(FileType::from_mime("Text/Plain; charset=utf-8"), FileType::Text);
        assert_eq!(FileType::from_mime("application/pdf"), FileType::Pdf);
        assert_eq!(FileType::from_mime(DOCX_MIME), FileType::Docx);
        assert_eq!(FileType::from_mime(PPTX_MIME), FileType::Pptx);
        assert_eq!(FileType::from_mime("image/png"), FileType::Image);
        assert_eq!(FileType::from_mime("image/svg+xml"), FileType::Image);
        assert_eq!(FileType::from_mime("application/zip"), FileType::Unsupported);
        assert_eq!(FileType::from_mime(""), FileType::Unsupported);
    }

    #[test]
    fn test_uploadable() {
        assert!(FileType::is_uploadable("application/pdf"));
        assert!(FileType::is_uploadable("image/jpeg"));
        assert!(!FileType::is_uploadable("image/svg+xml"));
        assert!(!FileType::is_uploadable("application/x-msdownload"));
    }

    #[test]
    fn test_chunk_sequence_is_contiguous() {
        let doc_id = Uuid::new_v4();
        let chunks = DocumentChunk::sequence(
            doc_id,
            vec!["one".to_string(), "two".to_string(), "three".to_string()],
        );
        let ordinals: Vec<u32> = chunks.iter().map(|c| c.chunk_index).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
        assert_eq!(chunks[2].chunk_size, 5);
        assert!(chunks.iter().all(|c| c.document_id == doc_id));
    }

    #[test]
    fn test_processing_state_serialization() {
        let state = ProcessingState::failed("bucket unreachable");
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "processing_failed");
        assert_eq!(json["processing_error"], "bucket unreachable");

        let state = ProcessingState::processed("three little words");
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "processed");
        assert_eq!(json["word_count"], 3);
    }
}
