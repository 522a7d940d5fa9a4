//! Configuration for the summarization and RAG service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// OpenAI-compatible completion and embedding API
    #[serde(default)]
    pub openai: OpenAiConfig,
    /// PDF summarization limits
    #[serde(default)]
    pub pdf: PdfConfig,
    /// Retrieval-augmented Q&A
    #[serde(default)]
    pub rag: RagConfig,
    /// YouTube transcript retrieval
    #[serde(default)]
    pub youtube: YoutubeConfig,
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Self::from_toml(&raw)?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Apply environment-style overrides from a lookup function
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.openai.api_key = key;
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.openai.base_url = url;
        }
        if let Some(host) = lookup("DIGEST_RAG_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("DIGEST_RAG_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid DIGEST_RAG_PORT value: {}", port),
            }
        }
    }

    /// Reject limits that would make chunking or retrieval meaningless
    pub fn validate(&self) -> Result<()> {
        let pdf = &self.pdf;
        if pdf.max_chunk_chars == 0 {
            return Err(Error::Config("pdf.max_chunk_chars must be positive".to_string()));
        }
        if pdf.chunk_overlap >= pdf.max_chunk_chars {
            return Err(Error::Config(format!(
                "pdf.chunk_overlap ({}) must be smaller than pdf.max_chunk_chars ({})",
                pdf.chunk_overlap, pdf.max_chunk_chars
            )));
        }
        if pdf.max_chunks == 0 {
            return Err(Error::Config("pdf.max_chunks must be positive".to_string()));
        }
        if pdf.max_concurrent_requests == 0 {
            return Err(Error::Config(
                "pdf.max_concurrent_requests must be positive".to_string(),
            ));
        }
        if self.rag.top_k == 0 {
            return Err(Error::Config("rag.top_k must be positive".to_string()));
        }
        Ok(())
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
    /// Enable CORS
    pub enable_cors: bool,
    /// Directory with the built browser client, served as a fallback
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            enable_cors: true,
            static_dir: None,
        }
    }
}

/// OpenAI-compatible API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key (usually supplied through OPENAI_API_KEY)
    pub api_key: String,
    /// Base URL including the version prefix
    pub base_url: String,
    /// Chat completion model
    pub chat_model: String,
    /// Embedding model
    pub embedding_model: String,
    /// Embedding dimensions (1536 for text-embedding-3-small)
    pub embedding_dimensions: usize,
    /// Maximum inputs per embeddings request
    pub embedding_batch_size: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for 429 / 5xx / transport failures
    pub max_retries: u32,
    /// Base delay for exponential backoff in milliseconds
    pub retry_backoff_ms: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dimensions: 1536,
            embedding_batch_size: 64,
            timeout_secs: 120,
            max_retries: 2,
            retry_backoff_ms: 500,
        }
    }
}

/// PDF summarization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum upload size in bytes (default: 5 MiB)
    pub max_file_bytes: usize,
    /// Maximum characters per chunk
    pub max_chunk_chars: usize,
    /// Maximum chunks per document; more is rejected, never truncated
    pub max_chunks: usize,
    /// Characters shared between adjacent chunks
    pub chunk_overlap: usize,
    /// Token ceiling for each summary completion
    pub summary_max_tokens: u32,
    /// Temperature for summary completions
    pub summary_temperature: f32,
    /// Describe embedded images and fold them into the summary
    pub interpret_images: bool,
    /// Seconds before text extraction falls back to the simpler parser
    pub extract_timeout_secs: u64,
    /// Maximum embedded images described per document
    pub max_images: usize,
    /// Concurrent completion calls during the map phase
    pub max_concurrent_requests: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 5 * 1024 * 1024, // 5 MiB
            max_chunk_chars: 12_000,
            max_chunks: 40,
            chunk_overlap: 500,
            summary_max_tokens: 1024,
            summary_temperature: 0.3,
            interpret_images: true,
            extract_timeout_secs: 60,
            max_images: 16,
            max_concurrent_requests: 8,
        }
    }
}

/// Retrieval-augmented Q&A configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Fragments retrieved per question
    pub top_k: usize,
    /// Temperature for answer generation
    pub temperature: f32,
    /// Token ceiling for answers
    pub max_tokens: u32,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            temperature: 0.2, // Low for grounded answers
            max_tokens: 1024,
        }
    }
}

/// YouTube transcript configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeConfig {
    /// Base URL for watch pages
    pub base_url: String,
    /// Preferred caption language
    pub language: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Token ceiling for video summaries
    pub summary_max_tokens: u32,
    /// Temperature for video summaries
    pub temperature: f32,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_string(),
            language: "en".to_string(),
            timeout_secs: 30,
            summary_max_tokens: 1024,
            temperature: 0.5,
        }
    }
}
