//! Document ingestion: extraction, chunking and the orchestrating pipeline

mod chunker;
pub mod extractor;
mod pipeline;

pub use chunker::TextChunker;
pub use extractor::{format_file_size, Extraction, FileExtractor};
pub use pipeline::IngestPipeline;
