//! doc-chat: document-aware chat service
//!
//! Users upload files; the service extracts their text (plain text, PDF,
//! DOCX, with guidance placeholders for PPTX and images), stores it in
//! sentence-aware chunks, and answers chat messages by quoting the documents
//! whose content shares a keyword with the question into the prompt sent to a
//! completion backend (Ollama or any OpenAI-compatible endpoint).

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod types;

pub use config::DocChatConfig;
pub use error::{Error, Result};
pub use server::{build_router, state::AppState, DocChatServer};
pub use types::{
    ChatRequest, ChatResponse, Document, DocumentChunk, FileType, IngestRequest, IngestResponse,
};
