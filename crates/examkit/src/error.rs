//! Error types for the examkit pipeline
//!
//! Every gateway and orchestration layer signals failure through [`Error`]
//! rather than panicking or smuggling error strings through success values.
//! Callers that surface failures to users can split them into the
//! configuration class (fix the deployment) and the processing class
//! (transient or upstream) via [`Error::is_configuration`].

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline error
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or placeholder credentials, unusable config file
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller handed us input the operation cannot work with
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Embedding backend call failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index upsert failed
    #[error("Vector index error: {0}")]
    VectorIndex(String),

    /// Text-generation backend call failed or returned an empty response
    #[error("LLM error: {0}")]
    Llm(String),

    /// The model replied, but nothing usable could be recovered from the
    /// reply. Carries the raw output for diagnosis.
    #[error("Unusable model output: {reason}")]
    UnusableModelOutput { reason: String, raw: String },

    /// Backing store rejected a read or write
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this failure is a deployment problem (service-unavailable
    /// class) rather than a transient or processing problem.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Short message suitable for returning to an end user.
    pub fn user_message(&self) -> String {
        if self.is_configuration() {
            "AI services are not configured by the administrator.".to_string()
        } else {
            format!("AI processing error: {self}")
        }
    }
}
