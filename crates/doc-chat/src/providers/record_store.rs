//! Record store trait for documents, chunks, conversations and messages

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{Conversation, Document, DocumentChunk, Message};

/// Trait for persistent record storage
///
/// Every read that takes a `user_id` only returns rows owned by that user.
///
/// Implementations:
/// - `SqliteStore`: Embedded SQLite database
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new document
    async fn create_document(&self, document: &Document) -> Result<()>;

    /// Get a document owned by `user_id`
    async fn get_document(&self, user_id: Uuid, id: Uuid) -> Result<Option<Document>>;

    /// All documents of a user, most recently updated first
    async fn list_documents(&self, user_id: Uuid) -> Result<Vec<Document>>;

    /// Up to `limit` documents with extracted content, most recently updated first
    async fn list_processed_documents(&self, user_id: Uuid, limit: usize) -> Result<Vec<Document>>;

    /// Overwrite content, metadata and `updated_at` of an existing document.
    ///
    /// Fails with `NotFound` when no row matches.
    async fn update_document(&self, document: &Document) -> Result<()>;

    /// Atomically swap a document's chunks for `chunks`; returns the number inserted.
    ///
    /// An empty slice clears the document's chunks.
    async fn replace_chunks(&self, document_id: Uuid, chunks: &[DocumentChunk]) -> Result<usize>;

    /// Chunks of a document ordered by `chunk_index`
    async fn list_chunks(&self, document_id: Uuid) -> Result<Vec<DocumentChunk>>;

    /// Insert a new conversation
    async fn create_conversation(&self, conversation: &Conversation) -> Result<()>;

    /// Get a conversation owned by `user_id`
    async fn get_conversation(&self, user_id: Uuid, id: Uuid) -> Result<Option<Conversation>>;

    /// All conversations of a user, most recently active first
    async fn list_conversations(&self, user_id: Uuid) -> Result<Vec<Conversation>>;

    /// Append a message and bump the conversation's `updated_at`
    async fn append_message(&self, message: &Message) -> Result<()>;

    /// The last `limit` messages of a conversation, oldest first
    async fn recent_messages(&self, conversation_id: Uuid, limit: usize) -> Result<Vec<Message>>;

    /// Every message of a conversation, oldest first
    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>>;

    /// Check if the store is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
