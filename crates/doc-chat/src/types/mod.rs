//! Core types for the document chat service

pub mod conversation;
pub mod document;
pub mod request;
pub mod response;

pub use conversation::{
    AttachedFile, Conversation, Message, MessageMetadata, MessageRole, SourceCitation,
};
pub use document::{
    Document, DocumentChunk, DocumentMetadata, FileType, ProcessingState, UploadMetadata,
};
pub use request::{ChatRequest, IngestRequest};
pub use response::{ChatResponse, ChatResponseMetadata, IngestResponse, UploadResponse};
