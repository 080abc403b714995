//! Retrieval-augmented question answering
//!
//! Embed the query, fetch nearest chunk ids from the vector index, resolve
//! their texts from the local store, and ask the LLM with the assembled
//! context. The index is eventually consistent with the local store, so ids
//! that no longer resolve are skipped; a query where nothing resolves
//! degrades to a "no relevant information" answer rather than an error.

use std::sync::Arc;

use crate::error::Result;
use crate::generation::PromptBuilder;
use crate::providers::{EmbeddingProvider, EmbeddingTask, LlmProvider, LlmTask};
use crate::retrieval::VectorIndex;
use crate::storage::ChunkStore;

/// Answer shown when retrieval produced no usable context
pub const NO_CONTEXT_ANSWER: &str = "Could not find relevant information for your query.";

/// Separator between chunk texts in the assembled context block
const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// A RAG answer plus the vector ids of the chunks it was grounded in.
///
/// The `context_ids` let callers attach later feedback to the exact chunks
/// used; they are empty when the answer was not grounded in any chunk.
#[derive(Debug, Clone)]
pub struct RagAnswer {
    /// Generated answer text
    pub answer: String,
    /// Vector ids of the chunks whose text went into the prompt
    pub context_ids: Vec<String>,
}

/// Retrieval-augmented generation engine
pub struct RagEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    chunks: Arc<dyn ChunkStore>,
    llm: Arc<dyn LlmProvider>,
    top_k: usize,
}

impl RagEngine {
    /// Create an engine from resolved providers
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        chunks: Arc<dyn ChunkStore>,
        llm: Arc<dyn LlmProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            chunks,
            llm,
            top_k,
        }
    }

    /// Answer a free-text query with retrieved context.
    ///
    /// Embedding and generation failures propagate as errors; an empty
    /// retrieval result is a successful answer with no context.
    pub async fn answer(&self, query: &str) -> Result<RagAnswer> {
        tracing::info!(query = %truncate(query, 100), "answering RAG query");

        let query_embedding = self.embedder.embed(query, EmbeddingTask::Query).await?;

        let neighbors = self.index.query(&query_embedding, self.top_k).await;
        if neighbors.is_empty() {
            tracing::info!("no neighbors found for query");
            return Ok(RagAnswer {
                answer: NO_CONTEXT_ANSWER.to_string(),
                context_ids: Vec::new(),
            });
        }

        let neighbor_ids: Vec<String> = neighbors.iter().map(|n| n.id.clone()).collect();
        let texts = self.chunks.texts_for_vector_ids(&neighbor_ids).await;

        let mut context_ids = Vec::new();
        let mut resolved = Vec::new();
        for neighbor in &neighbors {
            match texts.get(&neighbor.id) {
                Some(text) => {
                    tracing::debug!(id = %neighbor.id, distance = neighbor.distance, "using chunk");
                    context_ids.push(neighbor.id.clone());
                    resolved.push(text.as_str());
                }
                None => {
                    // The index is eventually consistent with the store;
                    // a stale id is expected after deletions, not corruption.
                    tracing::warn!(
                        id = %neighbor.id,
                        "index returned a chunk id with no stored text; skipping"
                    );
                }
            }
        }

        if resolved.is_empty() {
            tracing::warn!("no neighbor id resolved to a stored chunk");
            return Ok(RagAnswer {
                answer: NO_CONTEXT_ANSWER.to_string(),
                context_ids: Vec::new(),
            });
        }

        let context = resolved.join(CONTEXT_SEPARATOR);
        let prompt = PromptBuilder::build_qa_prompt(query, &context);
        let answer = self.llm.generate(&prompt, LlmTask::RagAnswer).await?;

        Ok(RagAnswer {
            answer,
            context_ids,
        })
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}
