//! Applying user feedback to the chunks that backed an AI response
//!
//! A low rating or an AI low-confidence signal flags every context chunk of
//! the rated response for review, driving the per-chunk counter that
//! curators use to find bad source material.

use crate::storage::ChunkStore;
use crate::types::FeedbackRecord;

/// Apply a feedback record, incrementing the review-flag counter of each
/// referenced context chunk when the feedback warrants it. Returns how many
/// chunks were flagged.
pub async fn apply_feedback(chunks: &dyn ChunkStore, record: &FeedbackRecord) -> usize {
    if !record.flags_review() {
        return 0;
    }

    if record.context_chunk_ids.is_empty() {
        tracing::info!(
            session_id = %record.session_id,
            "feedback warrants review but references no context chunks"
        );
        return 0;
    }

    let updated = chunks
        .increment_review_flags(&record.context_chunk_ids)
        .await;
    tracing::info!(
        session_id = %record.session_id,
        rating = ?record.rating,
        low_confidence = record.ai_low_confidence,
        updated,
        "flagged context chunks for review"
    );
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ChunkStore, MemoryChunkStore};
    use crate::types::Chunk;
    use uuid::Uuid;

    fn record(rating: Option<u8>, low_confidence: bool, ids: &[&str]) -> FeedbackRecord {
        FeedbackRecord {
            session_id: Uuid::new_v4(),
            rating,
            comment: None,
            ai_low_confidence: low_confidence,
            context_chunk_ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    async fn store_with_chunk(vector_id: &str) -> MemoryChunkStore {
        let store = MemoryChunkStore::new();
        store
            .insert_chunks(&[Chunk::new(
                Uuid::new_v4(),
                0,
                "text".to_string(),
                vector_id.to_string(),
                "google".to_string(),
            )])
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn low_rating_flags_context_chunks() {
        let store = store_with_chunk("v1").await;
        let updated = apply_feedback(&store, &record(Some(1), false, &["v1"])).await;
        assert_eq!(updated, 1);
        assert_eq!(store.chunk_by_vector_id("v1").unwrap().review_flags, 1);
    }

    #[tokio::test]
    async fn high_rating_flags_nothing() {
        let store = store_with_chunk("v1").await;
        let updated = apply_feedback(&store, &record(Some(5), false, &["v1"])).await;
        assert_eq!(updated, 0);
        assert_eq!(store.chunk_by_vector_id("v1").unwrap().review_flags, 0);
    }

    #[tokio::test]
    async fn low_confidence_alone_flags_chunks() {
        let store = store_with_chunk("v1").await;
        let updated = apply_feedback(&store, &record(None, true, &["v1"])).await;
        assert_eq!(updated, 1);
    }

    #[tokio::test]
    async fn unknown_chunk_ids_are_skipped() {
        let store = store_with_chunk("v1").await;
        let updated = apply_feedback(&store, &record(Some(1), false, &["v1", "ghost"])).await;
        assert_eq!(updated, 1);
    }
}
