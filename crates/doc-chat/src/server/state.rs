//! Application state for the doc-chat server

use std::sync::Arc;

use crate::config::DocChatConfig;
use crate::error::Result;
use crate::generation::ChatOrchestrator;
use crate::ingestion::{IngestPipeline, TextChunker};
use crate::providers::{
    build_provider, BlobStore, CompletionProvider, GenerationParams, LocalBlobStore, RecordStore,
};
use crate::storage::SqliteStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: DocChatConfig,
    /// Documents, chunks, conversations and messages
    records: Arc<dyn RecordStore>,
    /// Raw uploaded files
    blobs: Arc<dyn BlobStore>,
    /// Completion backend
    llm: Arc<dyn CompletionProvider>,
    /// Ingestion orchestrator
    pipeline: IngestPipeline,
    /// Chat orchestrator
    chat: ChatOrchestrator,
}

impl AppState {
    /// Create state backed by SQLite, a local blob directory and the configured backend
    pub async fn new(config: DocChatConfig) -> Result<Self> {
        tracing::info!(
            "Initializing doc-chat state (backend: {:?})...",
            config.llm.backend
        );

        let records: Arc<dyn RecordStore> =
            Arc::new(SqliteStore::open(&config.storage.database_path)?);
        tracing::info!(
            "Record store ready at {}",
            config.storage.database_path.display()
        );

        let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(&config.storage.blob_dir)?);
        tracing::info!("Blob store ready at {}", config.storage.blob_dir.display());

        let llm = build_provider(&config.llm)?;

        Ok(Self::from_parts(config, records, blobs, llm))
    }

    /// Assemble state from explicit collaborators
    pub fn from_parts(
        config: DocChatConfig,
        records: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        llm: Arc<dyn CompletionProvider>,
    ) -> Self {
        let pipeline = IngestPipeline::new(
            records.clone(),
            blobs.clone(),
            TextChunker::new(config.limits.chunk_size),
        );
        let chat = ChatOrchestrator::new(
            records.clone(),
            llm.clone(),
            &config.limits,
            GenerationParams::from_config(&config.llm),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                records,
                blobs,
                llm,
                pipeline,
                chat,
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &DocChatConfig {
        &self.inner.config
    }

    /// Get record store
    pub fn records(&self) -> &Arc<dyn RecordStore> {
        &self.inner.records
    }

    /// Get blob store
    pub fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.inner.blobs
    }

    /// Get completion provider
    pub fn llm(&self) -> &Arc<dyn CompletionProvider> {
        &self.inner.llm
    }

    /// Get ingestion pipeline
    pub fn pipeline(&self) -> &IngestPipeline {
        &self.inner.pipeline
    }

    /// Get chat orchestrator
    pub fn chat(&self) -> &ChatOrchestrator {
        &self.inner.chat
    }
}
