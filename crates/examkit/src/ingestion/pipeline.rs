//! Ingestion pipeline: extract, chunk, embed, persist, upsert
//!
//! Runs entirely within the triggering request. Chunks are embedded one at
//! a time so sequence numbers are deterministic; a chunk whose embedding
//! fails is skipped with a warning and the rest of the document still goes
//! through.

use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::providers::{EmbeddingProvider, EmbeddingTask};
use crate::retrieval::{VectorIndex, VectorPoint};
use crate::storage::ChunkStore;
use crate::types::{Chunk, SourceFormat};

use super::{Chunker, TextExtractor};

/// Document ingestion pipeline
pub struct IngestPipeline {
    chunker: Chunker,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    chunks: Arc<dyn ChunkStore>,
}

impl IngestPipeline {
    /// Create a pipeline from resolved providers
    pub fn new(
        chunker: Chunker,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        chunks: Arc<dyn ChunkStore>,
    ) -> Self {
        Self {
            chunker,
            embedder,
            index,
            chunks,
        }
    }

    /// Ingest a file on disk for the given document. Returns the chunks that
    /// were stored and upserted into the index.
    pub async fn ingest_file(
        &self,
        document_id: Uuid,
        path: &Path,
        format: SourceFormat,
    ) -> Result<Vec<Chunk>> {
        let text = TextExtractor::extract(path, format);
        self.ingest_text(document_id, &text).await
    }

    /// Ingest already-extracted text for the given document.
    pub async fn ingest_text(&self, document_id: Uuid, text: &str) -> Result<Vec<Chunk>> {
        if text.trim().is_empty() {
            tracing::warn!(%document_id, "no text content extracted; nothing to ingest");
            return Ok(Vec::new());
        }

        let pieces = self.chunker.chunk(text);
        if pieces.is_empty() {
            tracing::warn!(%document_id, "text could not be split into chunks");
            return Ok(Vec::new());
        }
        tracing::info!(%document_id, count = pieces.len(), "split document into chunks");

        let mut stored = Vec::new();
        let mut points = Vec::new();
        for (sequence_number, piece) in pieces.iter().enumerate() {
            match self.embedder.embed(piece, EmbeddingTask::Document).await {
                Ok(vector) => {
                    let chunk = Chunk::new(
                        document_id,
                        sequence_number as u32,
                        piece.clone(),
                        Uuid::new_v4().to_string(),
                        self.embedder.name().to_string(),
                    );
                    points.push(VectorPoint {
                        id: chunk.vector_id.clone(),
                        vector,
                    });
                    stored.push(chunk);
                }
                Err(e) => {
                    tracing::warn!(
                        %document_id,
                        sequence_number,
                        "skipping chunk that failed to embed: {e}"
                    );
                }
            }
        }

        if stored.is_empty() {
            tracing::warn!(%document_id, "no chunk embedded successfully; nothing to upsert");
            return Ok(Vec::new());
        }

        self.chunks.insert_chunks(&stored).await?;

        // TODO: remove the stored chunks again when the upsert fails, so the
        // local store and the index cannot drift apart at ingestion time.
        self.index.upsert(&points).await?;

        tracing::info!(%document_id, count = stored.len(), "ingested and indexed chunks");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::MemoryVectorIndex;
    use crate::storage::MemoryChunkStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embedder that fails on texts containing a marker word.
    struct FlakyEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for FlakyEmbedder {
        async fn embed(&self, text: &str, _task: EmbeddingTask) -> crate::Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.contains("unembeddable") {
                return Err(crate::Error::Embedding("backend refused".to_string()));
            }
            Ok(vec![text.len() as f32, 1.0])
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn pipeline(store: Arc<MemoryChunkStore>) -> IngestPipeline {
        IngestPipeline::new(
            Chunker::new(12, 0),
            Arc::new(FlakyEmbedder {
                calls: AtomicUsize::new(0),
            }),
            Arc::new(MemoryVectorIndex::new()),
            store,
        )
    }

    #[tokio::test]
    async fn blank_text_ingests_nothing() {
        let store = Arc::new(MemoryChunkStore::new());
        let chunks = pipeline(store.clone())
            .ingest_text(Uuid::new_v4(), "   \n ")
            .await
            .unwrap();
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn sequence_numbers_stay_deterministic_when_a_chunk_fails() {
        let store = Arc::new(MemoryChunkStore::new());
        let document_id = Uuid::new_v4();
        let chunks = pipeline(store.clone())
            .ingest_text(document_id, "first piece unembeddable now last piece")
            .await
            .unwrap();

        // The failing chunk is skipped but its sequence number is not reused.
        let numbers: Vec<u32> = chunks.iter().map(|c| c.sequence_number).collect();
        assert!(!chunks.is_empty());
        assert!(numbers.windows(2).all(|w| w[0] < w[1]));
        for chunk in &chunks {
            assert!(!chunk.text.contains("unembeddable"));
            assert_eq!(chunk.embedding_provider, "flaky");
            assert_eq!(chunk.document_id, document_id);
        }
    }
}
