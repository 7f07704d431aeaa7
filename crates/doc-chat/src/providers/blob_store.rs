//! Blob store trait for the raw bytes of uploaded files

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Trait for file blob storage
///
/// Implementations:
/// - `LocalBlobStore`: Local filesystem directory
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Download the bytes stored at `path`
    async fn get(&self, path: &str) -> Result<Bytes>;

    /// Store `data` at `path`, replacing any previous blob
    async fn put(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Check if storage is accessible
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Blob path of an uploaded file: `<user_id>/<document_id>/<filename>`
pub fn blob_path(user_id: &uuid::Uuid, document_id: &uuid::Uuid, filename: &str) -> String {
    let name: String = filename
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let name = match name.trim_matches('.') {
        "" => "file".to_string(),
        _ => name,
    };
    format!("{}/{}/{}", user_id, document_id, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_blob_path_layout() {
        let user = Uuid::new_v4();
        let doc = Uuid::new_v4();
        assert_eq!(
            blob_path(&user, &doc, "notes.txt"),
            format!("{}/{}/notes.txt", user, doc)
        );
    }

    #[test]
    fn test_blob_path_sanitizes_separators() {
        let user = Uuid::new_v4();
        let doc = Uuid::new_v4();
        let path = blob_path(&user, &doc, "../../etc/passwd");
        assert_eq!(path, format!("{}/{}/.._.._etc_passwd", user, doc));
        assert_eq!(path.matches('/').count(), 2);
        assert!(blob_path(&user, &doc, "..").ends_with("/file"));
    }
}
