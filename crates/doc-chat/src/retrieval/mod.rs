//! Context retrieval
//!
//! Keyword-overlap selection of the documents quoted into a chat prompt.

pub mod relevance;

pub use relevance::{RelevanceSelector, SelectedDocument};
