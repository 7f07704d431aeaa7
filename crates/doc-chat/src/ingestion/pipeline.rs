//! Ingestion orchestrator
//!
//! `uploaded -> processing -> processed | processing_failed`
//!
//! Failures before the bytes are in hand (unknown document, download error)
//! are returned as errors and leave the record untouched. Failures after that
//! are reported as a soft failure and recorded on the document.
//!
//! Bytes are only ever read from the document's own `storage_path`. Running
//! the pipeline again replaces the content and the chunk set.

use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::{BlobStore, RecordStore};
use crate::types::{Document, IngestRequest, IngestResponse, ProcessingState};

use super::chunker::TextChunker;
use super::extractor::FileExtractor;

/// Download, extract, persist and chunk one document
pub struct IngestPipeline {
    records: Arc<dyn RecordStore>,
    blobs: Arc<dyn BlobStore>,
    chunker: TextChunker,
}

impl IngestPipeline {
    pub fn new(
        records: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        chunker: TextChunker,
    ) -> Self {
        Self {
            records,
            blobs,
            chunker,
        }
    }

    /// Ingest the document named by `request` on behalf of `user_id`
    pub async fn ingest(&self, user_id: Uuid, request: &IngestRequest) -> Result<IngestResponse> {
        let document = self
            .records
            .get_document(user_id, request.document_id)
            .await?
            .ok_or_else(|| Error::not_found("Document", request.document_id))?;

        if request.file_path != document.storage_path {
            tracing::warn!(
                "Rejected ingest of document {}: path {} is not its stored blob",
                document.id,
                request.file_path
            );
            return Err(Error::validation(
                "filePath does not match the document's stored file",
            ));
        }

        tracing::info!(
            "Ingesting {} ({}) from {}",
            request.file_name,
            request.file_type,
            document.storage_path
        );

        let data = self.blobs.get(&document.storage_path).await.map_err(|e| {
            tracing::error!("Download of {} failed: {}", document.storage_path, e);
            e
        })?;

        let text = match self.extract_and_store(document.clone(), data, &request.file_type).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Processing of document {} failed: {}", document.id, e);
                self.mark_failed(document, &e).await;
                return Ok(IngestResponse::soft_failure(e.to_string()));
            }
        };

        let chunks = self.chunker.chunk_document(document.id, &text);
        let chunks_created = match self.records.replace_chunks(document.id, &chunks).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(
                    "Chunk insertion for document {} failed, content kept: {}",
                    document.id,
                    e
                );
                // stale chunks from an earlier run must not outlive the new content
                if let Err(e) = self.records.replace_chunks(document.id, &[]).await {
                    tracing::warn!("Could not clear chunks of document {}: {}", document.id, e);
                }
                0
            }
        };

        tracing::info!(
            "Ingested document {}: {} chars, {} chunks",
            document.id,
            text.chars().count(),
            chunks_created
        );

        Ok(IngestResponse::success(
            document.id,
            text.chars().count(),
            chunks_created,
        ))
    }

    /// Extract text and persist it as the document's content
    async fn extract_and_store(
        &self,
        mut document: Document,
        data: Bytes,
        mime_type: &str,
    ) -> Result<String> {
        let extraction = FileExtractor::extract_blocking(data, mime_type.to_string()).await;
        if extraction.degraded {
            tracing::warn!(
                "Extraction for {} degraded: {}",
                document.filename,
                extraction.reason.as_deref().unwrap_or("unknown reason")
            );
        }

        document.metadata.processing = ProcessingState::processed(&extraction.text);
        document.content = Some(extraction.text);
        document.updated_at = Utc::now();
        self.records.update_document(&document).await?;

        Ok(document.content.unwrap_or_default())
    }

    /// Best-effort `processing_failed` marker; drops chunks of earlier runs
    async fn mark_failed(&self, mut document: Document, error: &Error) {
        document.content = None;
        document.metadata.processing = ProcessingState::failed(error.to_string());
        document.updated_at = Utc::now();

        if let Err(e) = self.records.update_document(&document).await {
            tracing::warn!("Could not record failure on document {}: {}", document.id, e);
            return;
        }
        if let Err(e) = self.records.replace_chunks(document.id, &[]).await {
            tracing::warn!("Could not clear chunks of document {}: {}", document.id, e);
        }
    }
}
