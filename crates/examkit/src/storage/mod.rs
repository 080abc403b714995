//! Storage seams for chunks and exam records
//!
//! Persistence itself belongs to the surrounding application; the pipeline
//! only depends on these traits. The in-memory implementations back tests
//! and single-process use.

mod memory;

use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{Answer, Attempt, Chunk, Question};

pub use memory::{MemoryChunkStore, MemoryExamStore};

/// Store of document chunks, keyed by chunk id and by vector id
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Insert chunks created during ingestion
    async fn insert_chunks(&self, chunks: &[Chunk]) -> Result<()>;

    /// Look up a chunk by its id
    async fn chunk(&self, id: Uuid) -> Option<Chunk>;

    /// Resolve vector ids to chunk texts. Ids with no stored chunk are
    /// simply absent from the result.
    async fn texts_for_vector_ids(&self, vector_ids: &[String]) -> HashMap<String, String>;

    /// Atomically increment the review-flag counter of each referenced
    /// chunk. Returns how many chunks were updated; unknown ids are skipped.
    async fn increment_review_flags(&self, vector_ids: &[String]) -> usize;
}

/// Store of exam questions, attempts, and graded answers
#[async_trait]
pub trait ExamStore: Send + Sync {
    /// Look up a question by id
    async fn question(&self, id: Uuid) -> Option<Question>;

    /// Insert a question
    async fn insert_question(&self, question: Question) -> Result<()>;

    /// Look up an attempt by id
    async fn attempt(&self, id: Uuid) -> Option<Attempt>;

    /// Insert or update an attempt
    async fn save_attempt(&self, attempt: &Attempt) -> Result<()>;

    /// Persist graded answers
    async fn save_answers(&self, answers: &[Answer]) -> Result<()>;

    /// All answers recorded for an attempt
    async fn answers_for_attempt(&self, attempt_id: Uuid) -> Vec<Answer>;
}
