//! Prompt construction and chat orchestration

pub mod chat;
pub mod prompt;

pub use chat::ChatOrchestrator;
pub use prompt::PromptBuilder;
