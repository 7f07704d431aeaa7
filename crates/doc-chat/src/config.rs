//! Configuration for the document chat service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming a TOML config file
pub const CONFIG_PATH_ENV: &str = "DOCCHAT_CONFIG";
/// Environment variable carrying the completion backend API key
pub const API_KEY_ENV: &str = "DOCCHAT_LLM_API_KEY";

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocChatConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Pipeline constants (chunking, history, retrieval, upload bounds)
    #[serde(default)]
    pub limits: PipelineLimits,
    /// Completion backend configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Record and blob storage locations
    #[serde(default)]
    pub storage: StorageConfig,
}

impl DocChatConfig {
    /// Load configuration from `DOCCHAT_CONFIG` if set, else defaults.
    ///
    /// `DOCCHAT_LLM_API_KEY` overrides `llm.api_key` in either case.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                config.llm.api_key = Some(key);
            }
        }

        Ok(config)
    }

    /// Parse a TOML config file; missing sections fall back to defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&raw)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable permissive CORS
    pub enable_cors: bool,
    /// Request body limit for the multipart upload route
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 12 * 1024 * 1024, // headroom over max_file_size for multipart framing
        }
    }
}

/// Fixed constants of the ingestion and chat pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineLimits {
    /// Maximum chunk length in characters
    pub chunk_size: usize,
    /// Messages of history included in a prompt
    pub history_limit: usize,
    /// Most recently updated documents scanned for relevance
    pub document_scan_limit: usize,
    /// Characters of each selected document quoted into the prompt
    pub context_truncation_chars: usize,
    /// Largest accepted upload in bytes
    pub max_file_size: u64,
    /// Question tokens must be longer than this to count as keywords
    pub min_keyword_len: usize,
    /// Characters of the first message used as a new conversation title
    pub conversation_title_chars: usize,
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            history_limit: 10,
            document_scan_limit: 5,
            context_truncation_chars: 1000,
            max_file_size: 10 * 1024 * 1024, // 10MB
            min_keyword_len: 3,
            conversation_title_chars: 50,
        }
    }
}

/// Completion backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// Local Ollama server
    #[default]
    Ollama,
    /// Any OpenAI-compatible chat completions endpoint
    OpenAi,
}

/// Completion backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Which backend to call
    pub backend: LlmBackend,
    /// Base URL of the backend
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// Bearer token (OpenAI-compatible backends)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::Ollama,
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2:3b".to_string(),
            api_key: None,
            max_tokens: 1000,
            temperature: 0.7,
            timeout_secs: 120,
        }
    }
}

/// Storage locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Root directory of the blob store
    pub blob_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("doc-chat");

        Self {
            database_path: base.join("doc-chat.db"),
            blob_dir: base.join("blobs"),
        }
    }
}
