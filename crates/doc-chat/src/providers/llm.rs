//! Completion backend trait

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{LlmBackend, LlmConfig};
use crate::error::Result;

use super::ollama::OllamaLlm;
use super::openai::OpenAiLlm;

/// Fixed generation parameters sent with every prompt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl GenerationParams {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Trait for single-shot text completion
///
/// Implementations:
/// - `OllamaLlm`: Local Ollama server
/// - `OpenAiLlm`: OpenAI-compatible chat completions
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send one prompt, receive one completion. No retries.
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String>;

    /// Check if the provider is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}

/// Build the provider selected in config
pub fn build_provider(config: &LlmConfig) -> Result<Arc<dyn CompletionProvider>> {
    let provider: Arc<dyn CompletionProvider> = match config.backend {
        LlmBackend::Ollama => Arc::new(OllamaLlm::new(config)?),
        LlmBackend::OpenAi => Arc::new(OpenAiLlm::new(config)?),
    };

    tracing::info!(
        "Completion provider: {} (model: {})",
        provider.name(),
        provider.model()
    );
    Ok(provider)
}
