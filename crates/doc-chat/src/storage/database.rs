//! SQLite record store
//!
//! Durable storage for documents, chunks, conversations and messages.
//! Metadata columns hold JSON; timestamps are fixed-width RFC 3339 strings so
//! that text ordering matches time ordering.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::RecordStore;
use crate::types::{Conversation, Document, DocumentChunk, Message, MessageRole};

const DOCUMENT_COLUMNS: &str = "id, user_id, filename, mime_type, file_size, storage_path, \
                                content, metadata, created_at, updated_at";
const CHUNK_COLUMNS: &str = "id, document_id, content, chunk_index, chunk_size";
const CONVERSATION_COLUMNS: &str = "id, user_id, title, created_at, updated_at";
const MESSAGE_COLUMNS: &str = "id, conversation_id, role, content, metadata, created_at";

/// SQLite-backed [`RecordStore`]
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Create or open the database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::database(format!("Failed to open database: {}", e)))?;
        Self::with_connection(conn)
    }

    /// Create an in-memory database
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::database(format!("Failed to open in-memory database: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Run database migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;
            PRAGMA temp_store=MEMORY;
        "#,
        )
        .map_err(|e| Error::database(format!("Failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                filename TEXT NOT NULL,
                mime_type TEXT NOT NULL,
                file_size INTEGER NOT NULL,
                storage_path TEXT NOT NULL,
                content TEXT,
                metadata TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_documents_user_updated
                ON documents(user_id, updated_at);

            CREATE TABLE IF NOT EXISTS document_chunks (
                id TEXT PRIMARY KEY,
                document_id TEXT NOT NULL REFERENCES documents(id),
                content TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                chunk_size INTEGER NOT NULL,
                UNIQUE(document_id, chunk_index)
            );

            CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_conversations_user_updated
                ON conversations(user_id, updated_at);

            CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL REFERENCES conversations(id),
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                metadata TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_messages_conversation_created
                ON messages(conversation_id, created_at);
        "#,
        )
        .map_err(|e| Error::database(format!("Failed to run migrations: {}", e)))?;

        tracing::info!("Database migrations complete");
        Ok(())
    }

    /// Run a closure against the connection on the blocking pool
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock();
            f(&mut conn)
        })
        .await
        .map_err(|e| Error::internal(format!("Task join error: {}", e)))?
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn create_document(&self, document: &Document) -> Result<()> {
        let document = document.clone();
        self.run(move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO documents ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    DOCUMENT_COLUMNS
                ),
                params![
                    document.id.to_string(),
                    document.user_id.to_string(),
                    document.filename,
                    document.mime_type,
                    document.file_size as i64,
                    document.storage_path,
                    document.content,
                    serde_json::to_string(&document.metadata)?,
                    timestamp(&document.created_at),
                    timestamp(&document.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_document(&self, user_id: Uuid, id: Uuid) -> Result<Option<Document>> {
        self.run(move |conn| {
            let document = conn
                .query_row(
                    &format!(
                        "SELECT {} FROM documents WHERE id = ?1 AND user_id = ?2",
                        DOCUMENT_COLUMNS
                    ),
                    params![id.to_string(), user_id.to_string()],
                    row_to_document,
                )
                .optional()?;
            Ok(document)
        })
        .await
    }

    async fn list_documents(&self, user_id: Uuid) -> Result<Vec<Document>> {
        self.run(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM documents WHERE user_id = ?1 \
                 ORDER BY updated_at DESC, id DESC",
                DOCUMENT_COLUMNS
            ))?;
            let documents = stmt
                .query_map(params![user_id.to_string()], row_to_document)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(documents)
        })
        .await
    }

    async fn list_processed_documents(&self, user_id: Uuid, limit: usize) -> Result<Vec<Document>> {
        self.run(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM documents WHERE user_id = ?1 AND content IS NOT NULL \
                 ORDER BY updated_at DESC, id DESC LIMIT ?2",
                DOCUMENT_COLUMNS
            ))?;
            let documents = stmt
                .query_map(params![user_id.to_string(), limit as i64], row_to_document)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(documents)
        })
        .await
    }

    async fn update_document(&self, document: &Document) -> Result<()> {
        let document = document.clone();
        self.run(move |conn| {
            let updated = conn.execute(
                "UPDATE documents SET content = ?2, metadata = ?3, updated_at = ?4 WHERE id = ?1",
                params![
                    document.id.to_string(),
                    document.content,
                    serde_json::to_string(&document.metadata)?,
                    timestamp(&document.updated_at),
                ],
            )?;

            if updated == 0 {
                return Err(Error::not_found("Document", document.id));
            }
            Ok(())
        })
        .await
    }

    async fn replace_chunks(&self, document_id: Uuid, chunks: &[DocumentChunk]) -> Result<usize> {
        let chunks = chunks.to_vec();
        self.run(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM document_chunks WHERE document_id = ?1",
                params![document_id.to_string()],
            )?;
            {
                let mut stmt = tx.prepare(&format!(
                    "INSERT INTO document_chunks ({}) VALUES (?1, ?2, ?3, ?4, ?5)",
                    CHUNK_COLUMNS
                ))?;
                for chunk in &chunks {
                    stmt.execute(params![
                        chunk.id.to_string(),
                        document_id.to_string(),
                        chunk.content,
                        chunk.chunk_index as i64,
                        chunk.chunk_size as i64,
                    ])?;
                }
            }
            tx.commit()?;
            Ok(chunks.len())
        })
        .await
    }

    async fn list_chunks(&self, document_id: Uuid) -> Result<Vec<DocumentChunk>> {
        self.run(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM document_chunks WHERE document_id = ?1 ORDER BY chunk_index",
                CHUNK_COLUMNS
            ))?;
            let chunks = stmt
                .query_map(params![document_id.to_string()], row_to_chunk)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(chunks)
        })
        .await
    }

    async fn create_conversation(&self, conversation: &Conversation) -> Result<()> {
        let conversation = conversation.clone();
        self.run(move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO conversations ({}) VALUES (?1, ?2, ?3, ?4, ?5)",
                    CONVERSATION_COLUMNS
                ),
                params![
                    conversation.id.to_string(),
                    conversation.user_id.to_string(),
                    conversation.title,
                    timestamp(&conversation.created_at),
                    timestamp(&conversation.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_conversation(&self, user_id: Uuid, id: Uuid) -> Result<Option<Conversation>> {
        self.run(move |conn| {
            let conversation = conn
                .query_row(
                    &format!(
                        "SELECT {} FROM conversations WHERE id = ?1 AND user_id = ?2",
                        CONVERSATION_COLUMNS
                    ),
                    params![id.to_string(), user_id.to_string()],
                    row_to_conversation,
                )
                .optional()?;
            Ok(conversation)
        })
        .await
    }

    async fn list_conversations(&self, user_id: Uuid) -> Result<Vec<Conversation>> {
        self.run(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM conversations WHERE user_id = ?1 \
                 ORDER BY updated_at DESC, id DESC",
                CONVERSATION_COLUMNS
            ))?;
            let conversations = stmt
                .query_map(params![user_id.to_string()], row_to_conversation)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(conversations)
        })
        .await
    }

    async fn append_message(&self, message: &Message) -> Result<()> {
        let message = message.clone();
        self.run(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                &format!(
                    "INSERT INTO messages ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    MESSAGE_COLUMNS
                ),
                params![
                    message.id.to_string(),
                    message.conversation_id.to_string(),
                    message.role.as_str(),
                    message.content,
                    serde_json::to_string(&message.metadata)?,
                    timestamp(&message.created_at),
                ],
            )?;
            tx.execute(
                "UPDATE conversations SET updated_at = ?2 WHERE id = ?1",
                params![
                    message.conversation_id.to_string(),
                    timestamp(&message.created_at)
                ],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn recent_messages(&self, conversation_id: Uuid, limit: usize) -> Result<Vec<Message>> {
        self.run(move |conn| {
            // newest `limit` rows, flipped back to chronological order
            let mut stmt = conn.prepare(&format!(
                "SELECT {cols} FROM (
                     SELECT {cols}, rowid AS seq FROM messages
                     WHERE conversation_id = ?1
                     ORDER BY created_at DESC, seq DESC
                     LIMIT ?2
                 ) ORDER BY created_at ASC, seq ASC",
                cols = MESSAGE_COLUMNS
            ))?;
            let messages = stmt
                .query_map(
                    params![conversation_id.to_string(), limit as i64],
                    row_to_message,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(messages)
        })
        .await
    }

    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>> {
        self.run(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM messages WHERE conversation_id = ?1 \
                 ORDER BY created_at ASC, rowid ASC",
                MESSAGE_COLUMNS
            ))?;
            let messages = stmt
                .query_map(params![conversation_id.to_string()], row_to_message)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(messages)
        })
        .await
    }

    async fn health_check(&self) -> Result<bool> {
        self.run(|conn| {
            let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
            Ok(one == 1)
        })
        .await
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

// ==================== Row Mapping ====================

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn get_uuid(row: &Row, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn get_time(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn get_json<T: DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn row_to_document(row: &Row) -> rusqlite::Result<Document> {
    let file_size: i64 = row.get(4)?;
    Ok(Document {
        id: get_uuid(row, 0)?,
        user_id: get_uuid(row, 1)?,
        filename: row.get(2)?,
        mime_type: row.get(3)?,
        file_size: file_size as u64,
        storage_path: row.get(5)?,
        content: row.get(6)?,
        metadata: get_json(row, 7)?,
        created_at: get_time(row, 8)?,
        updated_at: get_time(row, 9)?,
    })
}

fn row_to_chunk(row: &Row) -> rusqlite::Result<DocumentChunk> {
    let chunk_index: i64 = row.get(3)?;
    let chunk_size: i64 = row.get(4)?;
    Ok(DocumentChunk {
        id: get_uuid(row, 0)?,
        document_id: get_uuid(row, 1)?,
        content: row.get(2)?,
        chunk_index: chunk_index as u32,
        chunk_size: chunk_size as u32,
    })
}

fn row_to_conversation(row: &Row) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: get_uuid(row, 0)?,
        user_id: get_uuid(row, 1)?,
        title: row.get(2)?,
        created_at: get_time(row, 3)?,
        updated_at: get_time(row, 4)?,
    })
}

fn row_to_message(row: &Row) -> rusqlite::Result<Message> {
    let role_str: String = row.get(2)?;
    let role = MessageRole::parse(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            format!("unknown message role: {}", role_str).into(),
        )
    })?;

    Ok(Message {
        id: get_uuid(row, 0)?,
        conversation_id: get_uuid(row, 1)?,
        role,
        content: row.get(3)?,
        metadata: get_json(row, 4)?,
        created_at: get_time(row, 5)?,
    })
}
