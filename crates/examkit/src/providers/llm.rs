//! LLM gateway trait and task hints

use async_trait::async_trait;

use crate::error::Result;

/// Task hint for a generation call.
///
/// Each provider maps the hint to a fixed system instruction; the prompt
/// itself is fully formed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmTask {
    /// Concise summarization of a text
    Summarize,
    /// Step-by-step explanation of a complex problem
    ExplainComplex,
    /// Context-grounded answer for a RAG query
    RagAnswer,
    /// Evaluation of a student answer
    GradeAnswer,
    /// Authoring exam questions from source text
    GenerateQuestions,
    /// Anything else
    General,
}

impl LlmTask {
    /// System instruction sent alongside the prompt
    pub fn system_instruction(self) -> &'static str {
        match self {
            Self::Summarize => "You are an AI assistant skilled in summarizing texts concisely.",
            Self::ExplainComplex => {
                "You are an AI assistant skilled in explaining complex topics clearly and step-by-step."
            }
            Self::RagAnswer => {
                "You are an AI assistant answering questions based on provided context."
            }
            Self::GradeAnswer => {
                "You are an AI assistant that evaluates student answers fairly and consistently."
            }
            Self::GenerateQuestions => {
                "You are an AI assistant skilled in generating relevant exam questions from a given text."
            }
            Self::General => "You are a helpful AI assistant.",
        }
    }

    /// Short label for logging
    pub fn label(self) -> &'static str {
        match self {
            Self::Summarize => "summarize",
            Self::ExplainComplex => "explain-complex",
            Self::RagAnswer => "rag-answer",
            Self::GradeAnswer => "grade-answer",
            Self::GenerateQuestions => "generate-questions",
            Self::General => "general",
        }
    }
}

/// Trait for text generation backends
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate text for a fully-formed prompt.
    ///
    /// The returned text is stripped of surrounding whitespace; a response
    /// that is empty after stripping is an error, never an empty success.
    async fn generate(&self, prompt: &str, task: LlmTask) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model identifier in use
    fn model(&self) -> &str;
}
