//! Provider abstractions for embeddings and text generation
//!
//! Trait-based gateways over interchangeable model backends. Providers are
//! resolved from configuration once, at construction time, and credentials
//! are validated there, before any network call.

pub mod embedding;
pub mod google;
pub mod llm;
pub mod openai;

use std::sync::Arc;

use crate::config::{AppConfig, ModelBackend};
use crate::error::Result;

pub use embedding::{EmbeddingProvider, EmbeddingTask};
pub use google::GoogleAiProvider;
pub use llm::{LlmProvider, LlmTask};
pub use openai::OpenAiProvider;

/// Build the embedding provider selected by configuration.
///
/// Fails fast with a configuration error when the selected backend's
/// credentials are missing or placeholders.
pub fn build_embedding_provider(config: &AppConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.providers.embedding_backend {
        ModelBackend::Google => Ok(Arc::new(GoogleAiProvider::new(&config.providers.google)?)),
        ModelBackend::OpenAi => Ok(Arc::new(OpenAiProvider::new(&config.providers.openai)?)),
    }
}

/// Build the LLM provider selected by configuration.
pub fn build_llm_provider(config: &AppConfig) -> Result<Arc<dyn LlmProvider>> {
    match config.providers.llm_backend {
        ModelBackend::Google => Ok(Arc::new(GoogleAiProvider::new(&config.providers.google)?)),
        ModelBackend::OpenAi => Ok(Arc::new(OpenAiProvider::new(&config.providers.openai)?)),
    }
}
