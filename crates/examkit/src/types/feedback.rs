//! User feedback on AI responses

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Feedback on a single AI interaction, identified by its session.
///
/// The `context_chunk_ids` are the vector ids returned with the answer being
/// rated, so negative feedback can be attributed to the exact chunks used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Session the rated response belongs to
    pub session_id: Uuid,
    /// Rating, 1-5 (1 worst)
    pub rating: Option<u8>,
    /// Free-text comment
    pub comment: Option<String>,
    /// Set when the AI itself signalled low confidence
    pub ai_low_confidence: bool,
    /// Vector ids of the chunks used as context for the rated response
    pub context_chunk_ids: Vec<String>,
}

impl FeedbackRecord {
    /// Whether this feedback should flag its context chunks for review:
    /// a rating of 2 or below, or an AI low-confidence signal.
    pub fn flags_review(&self) -> bool {
        self.rating.is_some_and(|r| r <= 2) || self.ai_low_confidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(rating: Option<u8>, low_confidence: bool) -> FeedbackRecord {
        FeedbackRecord {
            session_id: Uuid::new_v4(),
            rating,
            comment: None,
            ai_low_confidence: low_confidence,
            context_chunk_ids: Vec::new(),
        }
    }

    #[test]
    fn low_ratings_and_low_confidence_flag_review() {
        assert!(record(Some(1), false).flags_review());
        assert!(record(Some(2), false).flags_review());
        assert!(record(None, true).flags_review());
        assert!(!record(Some(3), false).flags_review());
        assert!(!record(None, false).flags_review());
    }
}
