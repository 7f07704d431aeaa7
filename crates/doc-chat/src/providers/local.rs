//! Local filesystem blob store

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

use super::blob_store::BlobStore;

/// Blob store rooted at a local directory
pub struct LocalBlobStore {
    /// Directory blobs are stored under
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a new local blob store, creating the root directory
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Resolve a blob path below the root, rejecting anything that escapes it
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let mut clean = PathBuf::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => clean.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(Error::blob_storage(format!("Invalid blob path: {}", path)));
                }
            }
        }

        if clean.as_os_str().is_empty() {
            return Err(Error::blob_storage("Empty blob path"));
        }
        Ok(self.root.join(clean))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn get(&self, path: &str) -> Result<Bytes> {
        let full = self.resolve(path)?;
        tokio::fs::read(&full)
            .await
            .map(Bytes::from)
            .map_err(|e| Error::blob_storage(format!("Failed to download {}: {}", path, e)))
    }

    async fn put(&self, path: &str, data: &[u8]) -> Result<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, data)
            .await
            .map_err(|e| Error::blob_storage(format!("Failed to upload {}: {}", path, e)))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.root.exists())
    }

    fn name(&self) -> &str {
        "local-filesystem"
    }
}
