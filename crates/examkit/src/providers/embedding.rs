//! Embedding gateway trait

use async_trait::async_trait;

use crate::error::Result;

/// How an embedding will be used. Backends with asymmetric models produce
/// different vectors for stored documents and for queries against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingTask {
    /// Embedding a document chunk for storage
    Document,
    /// Embedding a query for retrieval
    Query,
}

/// Trait for generating text embeddings
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>>;

    /// Best-effort batch embedding.
    ///
    /// Blank inputs are skipped and individually failing inputs are dropped
    /// with a warning, so the output may be shorter than the input. Callers
    /// that need input/output pairing must call [`embed`](Self::embed) per
    /// item instead.
    async fn embed_many(&self, texts: &[String], task: EmbeddingTask) -> Vec<Vec<f32>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            if text.trim().is_empty() {
                tracing::warn!("skipping blank input in embed_many");
                continue;
            }
            match self.embed(text, task).await {
                Ok(vector) => embeddings.push(vector),
                Err(e) => tracing::warn!("dropping input that failed to embed: {e}"),
            }
        }
        embeddings
    }

    /// Provider name for logging and chunk tagging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct EvenLengthEmbedder;

    #[async_trait]
    impl EmbeddingProvider for EvenLengthEmbedder {
        async fn embed(&self, text: &str, _task: EmbeddingTask) -> Result<Vec<f32>> {
            if text.len() % 2 != 0 {
                return Err(Error::Embedding("odd length".to_string()));
            }
            Ok(vec![text.len() as f32])
        }

        fn name(&self) -> &str {
            "even"
        }
    }

    #[tokio::test]
    async fn embed_many_skips_blanks_and_failures() {
        let texts = vec![
            "ab".to_string(),
            "   ".to_string(),
            "odd".to_string(),
            "abcd".to_string(),
        ];
        let embeddings = EvenLengthEmbedder
            .embed_many(&texts, EmbeddingTask::Document)
            .await;

        // Best-effort: output length is not the input length.
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0], vec![2.0]);
        assert_eq!(embeddings[1], vec![4.0]);
    }
}
