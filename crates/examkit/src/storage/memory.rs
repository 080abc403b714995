//! In-memory reference implementations of the storage seams

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{Answer, Attempt, Chunk, Question};

use super::{ChunkStore, ExamStore};

/// Concurrent in-memory chunk store
#[derive(Default)]
pub struct MemoryChunkStore {
    chunks: DashMap<Uuid, Chunk>,
    by_vector_id: DashMap<String, Uuid>,
}

impl MemoryChunkStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the store holds no chunks
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Look up a chunk by its vector id
    pub fn chunk_by_vector_id(&self, vector_id: &str) -> Option<Chunk> {
        let id = *self.by_vector_id.get(vector_id)?;
        self.chunks.get(&id).map(|entry| entry.clone())
    }
}

#[async_trait]
impl ChunkStore for MemoryChunkStore {
    async fn insert_chunks(&self, chunks: &[Chunk]) -> Result<()> {
        for chunk in chunks {
            self.by_vector_id.insert(chunk.vector_id.clone(), chunk.id);
            self.chunks.insert(chunk.id, chunk.clone());
        }
        Ok(())
    }

    async fn chunk(&self, id: Uuid) -> Option<Chunk> {
        self.chunks.get(&id).map(|entry| entry.clone())
    }

    async fn texts_for_vector_ids(&self, vector_ids: &[String]) -> HashMap<String, String> {
        let mut texts = HashMap::new();
        for vector_id in vector_ids {
            if let Some(chunk) = self.chunk_by_vector_id(vector_id) {
                texts.insert(vector_id.clone(), chunk.text);
            }
        }
        texts
    }

    async fn increment_review_flags(&self, vector_ids: &[String]) -> usize {
        let mut updated = 0;
        for vector_id in vector_ids {
            let Some(id) = self.by_vector_id.get(vector_id).map(|entry| *entry) else {
                tracing::warn!(%vector_id, "feedback references unknown chunk; skipping");
                continue;
            };
            // The entry guard holds the shard lock, making the increment
            // atomic with respect to concurrent feedback events.
            if let Some(mut chunk) = self.chunks.get_mut(&id) {
                chunk.review_flags += 1;
                updated += 1;
            }
        }
        updated
    }
}

/// Concurrent in-memory exam store
#[derive(Default)]
pub struct MemoryExamStore {
    questions: DashMap<Uuid, Question>,
    attempts: DashMap<Uuid, Attempt>,
    answers: DashMap<Uuid, Vec<Answer>>,
}

impl MemoryExamStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExamStore for MemoryExamStore {
    async fn question(&self, id: Uuid) -> Option<Question> {
        self.questions.get(&id).map(|entry| entry.clone())
    }

    async fn insert_question(&self, question: Question) -> Result<()> {
        self.questions.insert(question.id, question);
        Ok(())
    }

    async fn attempt(&self, id: Uuid) -> Option<Attempt> {
        self.attempts.get(&id).map(|entry| entry.clone())
    }

    async fn save_attempt(&self, attempt: &Attempt) -> Result<()> {
        self.attempts.insert(attempt.id, attempt.clone());
        Ok(())
    }

    async fn save_answers(&self, answers: &[Answer]) -> Result<()> {
        for answer in answers {
            self.answers
                .entry(answer.attempt_id)
                .or_default()
                .push(answer.clone());
        }
        Ok(())
    }

    async fn answers_for_attempt(&self, attempt_id: Uuid) -> Vec<Answer> {
        self.answers
            .get(&attempt_id)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, vector_id: &str) -> Chunk {
        Chunk::new(
            Uuid::new_v4(),
            0,
            text.to_string(),
            vector_id.to_string(),
            "google".to_string(),
        )
    }

    #[tokio::test]
    async fn vector_id_lookup_resolves_texts() {
        let store = MemoryChunkStore::new();
        store
            .insert_chunks(&[chunk("alpha", "v1"), chunk("beta", "v2")])
            .await
            .unwrap();

        let texts = store
            .texts_for_vector_ids(&["v2".to_string(), "missing".to_string()])
            .await;
        assert_eq!(texts.len(), 1);
        assert_eq!(texts["v2"], "beta");
    }

    #[tokio::test]
    async fn review_flags_increment_and_skip_unknown() {
        let store = MemoryChunkStore::new();
        store.insert_chunks(&[chunk("alpha", "v1")]).await.unwrap();

        let updated = store
            .increment_review_flags(&["v1".to_string(), "ghost".to_string()])
            .await;
        assert_eq!(updated, 1);

        let updated = store.increment_review_flags(&["v1".to_string()]).await;
        assert_eq!(updated, 1);
        assert_eq!(store.chunk_by_vector_id("v1").unwrap().review_flags, 2);
    }
}
