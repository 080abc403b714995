//! examkit: AI pipeline for study materials
//!
//! This crate turns uploaded study documents into a searchable knowledge base,
//! answers free-text questions over that base with retrieval-augmented
//! generation, grades exam submissions with an LLM evaluator, and generates
//! exam questions from source text. Embedding models, text-generation models,
//! and the similarity-search index are all external services consumed through
//! provider traits.

pub mod config;
pub mod error;
pub mod feedback;
pub mod generation;
pub mod grading;
pub mod ingestion;
pub mod providers;
pub mod rag;
pub mod retrieval;
pub mod storage;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use rag::{RagAnswer, RagEngine};
pub use types::{
    document::{Chunk, SourceFormat},
    exam::{Answer, Attempt, AttemptStatus, Question, QuestionOptions, QuestionType},
    feedback::FeedbackRecord,
};
