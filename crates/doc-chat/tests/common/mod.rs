//! Shared fixtures for HTTP-level tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use doc_chat::error::{Error, Result};
use doc_chat::providers::{
    BlobStore, CompletionProvider, GenerationParams, LocalBlobStore, RecordStore,
};
use doc_chat::storage::SqliteStore;
use doc_chat::types::{Conversation, Document, DocumentChunk, Message};
use doc_chat::{build_router, AppState, DocChatConfig};

/// Completion provider that replays a fixed answer and records prompts
pub struct ScriptedLlm {
    reply: String,
    fail: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn answering(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: String::new(),
            fail: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn last_prompt(&self) -> String {
        self.prompts.lock().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedLlm {
    async fn complete(&self, prompt: &str, _params: &GenerationParams) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        if self.fail {
            return Err(Error::llm("backend unavailable"));
        }
        Ok(self.reply.clone())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.fail)
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }
}

/// Blob store whose downloads always fail
pub struct UnreachableBlobStore;

#[async_trait]
impl BlobStore for UnreachableBlobStore {
    async fn get(&self, path: &str) -> Result<Bytes> {
        Err(Error::blob_storage(format!("connection refused while fetching {}", path)))
    }

    async fn put(&self, _path: &str, _data: &[u8]) -> Result<()> {
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "unreachable"
    }
}

/// SQLite store with injectable write failures
pub struct FlakyStore {
    pub inner: SqliteStore,
    /// Number of upcoming `update_document` calls that fail
    pub update_failures: AtomicUsize,
    /// Number of upcoming `replace_chunks` calls that fail
    pub chunk_failures: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            update_failures: AtomicUsize::new(0),
            chunk_failures: AtomicUsize::new(0),
        }
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl RecordStore for FlakyStore {
    async fn create_document(&self, document: &Document) -> Result<()> {
        self.inner.create_document(document).await
    }

    async fn get_document(&self, user_id: Uuid, id: Uuid) -> Result<Option<Document>> {
        self.inner.get_document(user_id, id).await
    }

    async fn list_documents(&self, user_id: Uuid) -> Result<Vec<Document>> {
        self.inner.list_documents(user_id).await
    }

    async fn list_processed_documents(&self, user_id: Uuid, limit: usize) -> Result<Vec<Document>> {
        self.inner.list_processed_documents(user_id, limit).await
    }

    async fn update_document(&self, document: &Document) -> Result<()> {
        if Self::take_failure(&self.update_failures) {
            return Err(Error::database("disk I/O error"));
        }
        self.inner.update_document(document).await
    }

    async fn replace_chunks(&self, document_id: Uuid, chunks: &[DocumentChunk]) -> Result<usize> {
        if Self::take_failure(&self.chunk_failures) {
            return Err(Error::database("database is locked"));
        }
        self.inner.replace_chunks(document_id, chunks).await
    }

    async fn list_chunks(&self, document_id: Uuid) -> Result<Vec<DocumentChunk>> {
        self.inner.list_chunks(document_id).await
    }

    async fn create_conversation(&self, conversation: &Conversation) -> Result<()> {
        self.inner.create_conversation(conversation).await
    }

    async fn get_conversation(&self, user_id: Uuid, id: Uuid) -> Result<Option<Conversation>> {
        self.inner.get_conversation(user_id, id).await
    }

    async fn list_conversations(&self, user_id: Uuid) -> Result<Vec<Conversation>> {
        self.inner.list_conversations(user_id).await
    }

    async fn append_message(&self, message: &Message) -> Result<()> {
        self.inner.append_message(message).await
    }

    async fn recent_messages(&self, conversation_id: Uuid, limit: usize) -> Result<Vec<Message>> {
        self.inner.recent_messages(conversation_id, limit).await
    }

    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>> {
        self.inner.list_messages(conversation_id).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.inner.health_check().await
    }

    fn name(&self) -> &str {
        "flaky-sqlite"
    }
}

/// Router plus handles on its collaborators
pub struct TestApp {
    pub router: Router,
    pub store: Arc<FlakyStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub llm: Arc<ScriptedLlm>,
    pub user_id: Uuid,
    _blob_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(DocChatConfig::default(), ScriptedLlm::answering("scripted answer"), false)
    }

    pub fn with_config(config: DocChatConfig) -> Self {
        Self::build(config, ScriptedLlm::answering("scripted answer"), false)
    }

    pub fn with_llm(llm: ScriptedLlm) -> Self {
        Self::build(DocChatConfig::default(), llm, false)
    }

    pub fn with_unreachable_blobs() -> Self {
        Self::build(DocChatConfig::default(), ScriptedLlm::answering("scripted answer"), true)
    }

    fn build(mut config: DocChatConfig, llm: ScriptedLlm, unreachable_blobs: bool) -> Self {
        let blob_dir = tempfile::tempdir().unwrap();
        config.storage.blob_dir = blob_dir.path().to_path_buf();

        let store = Arc::new(FlakyStore::new(SqliteStore::in_memory().unwrap()));
        let blobs: Arc<dyn BlobStore> = if unreachable_blobs {
            Arc::new(UnreachableBlobStore)
        } else {
            Arc::new(LocalBlobStore::new(blob_dir.path()).unwrap())
        };
        let llm = Arc::new(llm);

        let state = AppState::from_parts(config, store.clone(), blobs.clone(), llm.clone());
        Self {
            router: build_router(state),
            store,
            blobs,
            llm,
            user_id: Uuid::new_v4(),
            _blob_dir: blob_dir,
        }
    }

    /// Store a blob and an unprocessed document record pointing at it
    pub async fn seed_document(&self, filename: &str, mime: &str, data: &[u8]) -> Document {
        let document_id = Uuid::new_v4();
        let path = doc_chat::providers::blob_path(&self.user_id, &document_id, filename);
        self.blobs.put(&path, data).await.unwrap();

        let mut document = Document::new(self.user_id, filename, mime, data.len() as u64, path);
        document.id = document_id;
        self.store.create_document(&document).await.unwrap();
        document
    }

    /// Store an already-processed document
    pub async fn seed_processed(&self, filename: &str, content: &str) -> Document {
        let mut document = self.seed_document(filename, "text/plain", content.as_bytes()).await;
        document.content = Some(content.to_string());
        document.metadata.processing = doc_chat::types::ProcessingState::processed(content);
        self.store.inner.update_document(&document).await.unwrap();
        document
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .header("x-user-id", self.user_id.to_string())
            .body(Body::from(body.to_string()))
            .unwrap();
        send(&self.router, request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header("x-user-id", self.user_id.to_string())
            .body(Body::empty())
            .unwrap();
        send(&self.router, request).await
    }

    /// Multipart upload of a single `file` field
    pub async fn upload(&self, filename: &str, mime: Option<&str>, data: &[u8]) -> (StatusCode, Value) {
        let boundary = "doc-chat-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        if let Some(mime) = mime {
            body.extend_from_slice(format!("Content-Type: {}\r\n", mime).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/documents")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .header("x-user-id", self.user_id.to_string())
            .body(Body::from(body))
            .unwrap();
        send(&self.router, request).await
    }
}

/// Send a request and decode the body as JSON (`Value::Null` when it is not JSON)
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
