//! Response bodies of the HTTP operations

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::conversation::SourceCitation;
use super::document::Document;

/// Outcome of an ingestion that got past the download step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum IngestResponse {
    /// Content stored (chunk insertion may still have failed)
    #[serde(rename_all = "camelCase")]
    Success {
        success: bool,
        document_id: Uuid,
        /// Characters of extracted text
        extracted_length: usize,
        chunks_created: usize,
    },
    /// Post-download processing failed; reported with a success status
    SoftFailure {
        success: bool,
        error: String,
        details: String,
    },
}

impl IngestResponse {
    pub fn success(document_id: Uuid, extracted_length: usize, chunks_created: usize) -> Self {
        Self::Success {
            success: true,
            document_id,
            extracted_length,
            chunks_created,
        }
    }

    pub fn soft_failure(details: impl Into<String>) -> Self {
        Self::SoftFailure {
            success: false,
            error: "Document processing failed".to_string(),
            details: details.into(),
        }
    }
}

/// Body of a successful `POST /api/chat`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    /// Assistant reply
    pub response: String,
    pub metadata: ChatResponseMetadata,
}

/// Metadata returned with an assistant reply
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponseMetadata {
    pub sources: Vec<SourceCitation>,
    pub has_document_context: bool,
    pub conversation_id: Uuid,
}

/// Body of a successful `POST /api/documents`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Document record after ingestion
    pub document: Document,
    /// Ingestion outcome
    pub ingestion: IngestResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_wire_format() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(IngestResponse::success(id, 28, 2)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["documentId"], id.to_string());
        assert_eq!(json["extractedLength"], 28);
        assert_eq!(json["chunksCreated"], 2);
    }

    #[test]
    fn test_soft_failure_wire_format() {
        let json = serde_json::to_value(IngestResponse::soft_failure("disk full")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["details"], "disk full");
        assert!(json["error"].is_string());
    }
}
