//! Configuration for the examkit pipeline
//!
//! Loaded once at startup (TOML file plus environment overrides for API
//! keys) and resolved into provider objects at construction time; no leaf
//! function reads configuration at call time.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Provider selection and credentials
    #[serde(default)]
    pub providers: ProviderConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Vector index configuration
    #[serde(default)]
    pub vector_index: VectorIndexConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let mut config: AppConfig = toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("invalid config file: {e}")))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Default configuration with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
            self.providers.google.api_key = key;
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.providers.openai.api_key = key;
        }
    }
}

/// Backend selection for embeddings and text generation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    /// Google AI (Gemini) REST API
    #[default]
    Google,
    /// OpenAI REST API
    OpenAi,
}

/// Provider selection and per-provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Backend used for embeddings
    #[serde(default)]
    pub embedding_backend: ModelBackend,
    /// Backend used for text generation
    #[serde(default)]
    pub llm_backend: ModelBackend,
    /// Google AI settings
    #[serde(default)]
    pub google: GoogleConfig,
    /// OpenAI settings
    #[serde(default)]
    pub openai: OpenAiConfig,
}

/// Google AI (generativelanguage API) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// API key; empty or placeholder values fail provider construction
    #[serde(default)]
    pub api_key: String,
    /// Embedding model
    #[serde(default = "default_google_embedding_model")]
    pub embedding_model: String,
    /// Generation model
    #[serde(default = "default_google_generation_model")]
    pub generation_model: String,
    /// Sampling temperature for generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens per generated response
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            embedding_model: default_google_embedding_model(),
            generation_model: default_google_generation_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_request_timeout(),
        }
    }
}

/// OpenAI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API key; empty or placeholder values fail provider construction
    #[serde(default)]
    pub api_key: String,
    /// Embedding model
    #[serde(default = "default_openai_embedding_model")]
    pub embedding_model: String,
    /// Generation model
    #[serde(default = "default_openai_generation_model")]
    pub generation_model: String,
    /// Sampling temperature for generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            embedding_model: default_openai_embedding_model(),
            generation_model: default_openai_generation_model(),
            temperature: default_temperature(),
            timeout_secs: default_request_timeout(),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum rendered chunk length in characters
    pub max_chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of neighbors fetched per query
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

/// Vector index backend selection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// In-process brute-force index (development and tests)
    #[default]
    Memory,
    /// Remote similarity-search service over HTTP
    Http,
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndexConfig {
    /// Index backend
    #[serde(default)]
    pub backend: IndexBackend,
    /// Base URL of the remote index service (http backend)
    #[serde(default = "default_index_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::default(),
            base_url: default_index_url(),
            timeout_secs: default_request_timeout(),
        }
    }
}

/// Whether a configured API key is absent or still a placeholder.
pub fn key_is_placeholder(key: &str) -> bool {
    let key = key.trim();
    key.is_empty() || key.starts_with("YOUR_") || key.eq_ignore_ascii_case("changeme")
}

fn default_google_embedding_model() -> String {
    "text-embedding-004".to_string()
}

fn default_google_generation_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_openai_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_openai_generation_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_output_tokens() -> u32 {
    1024
}

fn default_request_timeout() -> u64 {
    120
}

fn default_index_url() -> String {
    "http://localhost:8080".to_string()
}
