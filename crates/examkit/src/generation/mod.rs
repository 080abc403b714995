//! LLM-backed content generation: prompts, summaries, explanations,
//! question authoring

mod prompt;
mod questions;

use crate::error::{Error, Result};
use crate::providers::{LlmProvider, LlmTask};

pub use prompt::PromptBuilder;
pub use questions::{extract_json_elements, GeneratedQuestion, QuestionGenerator};

/// Produce a concise summary of `text`.
pub async fn summarize(llm: &dyn LlmProvider, text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Err(Error::InvalidInput(
            "no text provided for summarization".to_string(),
        ));
    }
    llm.generate(&PromptBuilder::build_summary_prompt(text), LlmTask::Summarize)
        .await
}

/// Produce a detailed, step-by-step explanation for a query or problem,
/// optionally grounded in `context`.
pub async fn explain(
    llm: &dyn LlmProvider,
    query: &str,
    context: Option<&str>,
) -> Result<String> {
    if query.trim().is_empty() {
        return Err(Error::InvalidInput(
            "no query provided for explanation".to_string(),
        ));
    }
    llm.generate(
        &PromptBuilder::build_explanation_prompt(query, context),
        LlmTask::ExplainComplex,
    )
    .await
}
