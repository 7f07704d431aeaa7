//! Request bodies of the HTTP operations

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::conversation::AttachedFile;

/// Body of `POST /api/process-document`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestRequest {
    /// Document record to fill in
    pub document_id: Uuid,
    /// Blob storage path of the uploaded bytes
    pub file_path: String,
    /// Original filename
    pub file_name: String,
    /// Declared MIME type
    pub file_type: String,
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The user's new message
    pub message: String,
    /// Existing conversation; a new one is created when absent
    #[serde(default)]
    pub conversation_id: Option<Uuid>,
    /// Files attached to this turn
    #[serde(default)]
    pub files: Vec<AttachedFile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_request_camel_case() {
        let id = Uuid::new_v4();
        let raw = format!(
            r#"{{"documentId":"{}","filePath":"u/d/a.txt","fileName":"a.txt","fileType":"text/plain"}}"#,
            id
        );
        let req: IngestRequest = serde_json::from_str(&raw).unwrap();
        assert_eq!(req.document_id, id);
        assert_eq!(req.file_path, "u/d/a.txt");
    }

    #[test]
    fn test_chat_request_optional_fields() {
        let req: ChatRequest = serde_json::from_str(r#"{"message":"hello"}"#).unwrap();
        assert!(req.conversation_id.is_none());
        assert!(req.files.is_empty());
    }
}
