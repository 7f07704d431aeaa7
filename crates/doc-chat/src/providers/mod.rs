//! Provider abstractions for record storage, blob storage and completion
//!
//! Each collaborator sits behind an `async_trait` so handlers and the
//! pipeline can be exercised against in-memory or scripted implementations.

pub mod blob_store;
pub mod llm;
pub mod local;
pub mod ollama;
pub mod openai;
pub mod record_store;

pub use blob_store::{blob_path, BlobStore};
pub use llm::{build_provider, CompletionProvider, GenerationParams};
pub use local::LocalBlobStore;
pub use record_store::RecordStore;
