//! AI question generation with defensive output parsing
//!
//! Models asked for JSON produce JSON most of the time, wrapped in fences or
//! prose some of the time. Recovery is three-tiered: parse the cleaned text
//! directly, then the outermost `[...]` span, then the outermost `{...}`
//! span wrapped as a one-element list.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::{LlmProvider, LlmTask};
use crate::types::{QuestionOptions, QuestionType};

use super::PromptBuilder;

/// A validated question produced by the model
#[derive(Debug, Clone)]
pub struct GeneratedQuestion {
    /// Question text
    pub text: String,
    /// Question kind
    pub question_type: QuestionType,
    /// Choices and correct key (multiple choice only)
    pub options: Option<QuestionOptions>,
    /// Difficulty label, when the model provided one
    pub difficulty: Option<String>,
}

/// Generates exam questions from source text
pub struct QuestionGenerator {
    llm: Arc<dyn LlmProvider>,
}

impl QuestionGenerator {
    /// Create a generator over the given LLM gateway
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Generate `count` questions of the allowed types from `source_text`.
    ///
    /// Invalid elements in the model output are dropped with a warning. If
    /// nothing survives validation the call fails with an error carrying
    /// the raw model output, distinguishing "nothing usable" from a valid
    /// empty result.
    pub async fn generate(
        &self,
        source_text: &str,
        count: usize,
        allowed_types: &[QuestionType],
    ) -> Result<Vec<GeneratedQuestion>> {
        if source_text.trim().is_empty() {
            return Err(Error::InvalidInput(
                "no text content provided for question generation".to_string(),
            ));
        }

        let prompt =
            PromptBuilder::build_question_generation_prompt(source_text, count, allowed_types);
        tracing::info!(count, "requesting generated questions");
        let raw = self.llm.generate(&prompt, LlmTask::GenerateQuestions).await?;

        let elements = extract_json_elements(&raw).map_err(|reason| Error::UnusableModelOutput {
            reason,
            raw: raw.clone(),
        })?;

        let questions: Vec<GeneratedQuestion> =
            elements.iter().filter_map(validate_element).collect();

        if questions.is_empty() {
            return Err(Error::UnusableModelOutput {
                reason: "generated questions were not in the expected format or were incomplete"
                    .to_string(),
                raw,
            });
        }

        tracing::info!(valid = questions.len(), "validated generated questions");
        Ok(questions)
    }
}

/// Recover a list of JSON values from free-form model text.
///
/// Pure and independently testable; returns the failure reason as a string
/// so callers can attach the raw output themselves.
pub fn extract_json_elements(raw: &str) -> std::result::Result<Vec<Value>, String> {
    let cleaned = strip_code_fence(raw.trim());

    match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Array(items)) => return Ok(items),
        Ok(object @ Value::Object(_)) => return Ok(vec![object]),
        _ => {}
    }

    if let (Some(start), Some(end)) = (cleaned.find('['), cleaned.rfind(']')) {
        if end > start {
            if let Ok(Value::Array(items)) = serde_json::from_str(&cleaned[start..=end]) {
                return Ok(items);
            }
        }
    }

    if let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) {
        if end > start {
            if let Ok(object @ Value::Object(_)) = serde_json::from_str(&cleaned[start..=end]) {
                return Ok(vec![object]);
            }
        }
    }

    Err("no JSON array or object found in model output".to_string())
}

/// Strip a surrounding fenced-code block marker, if present.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the fence line itself (it may carry a language tag).
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Option-map keys that are metadata rather than offered choices
const NON_CHOICE_KEYS: [&str; 3] = ["correct", "options_text", "explanation"];

fn validate_element(value: &Value) -> Option<GeneratedQuestion> {
    let Some(object) = value.as_object() else {
        tracing::warn!("skipping non-object item in generated questions");
        return None;
    };

    let text = object
        .get("question_text")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim();
    let type_str = object
        .get("question_type")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim();
    if text.is_empty() || type_str.is_empty() {
        tracing::warn!("skipping generated question with missing required fields");
        return None;
    }

    let Some(question_type) = QuestionType::parse(type_str) else {
        tracing::warn!(question_type = type_str, "skipping generated question of unknown type");
        return None;
    };

    let options = if question_type == QuestionType::MultipleChoice {
        let Some(map) = object.get("options").and_then(Value::as_object) else {
            tracing::warn!("skipping generated multiple-choice question without an options object");
            return None;
        };
        let Some(correct) = map.get("correct").and_then(Value::as_str) else {
            tracing::warn!("skipping generated multiple-choice question without a correct key");
            return None;
        };

        let choices: BTreeMap<String, String> = map
            .iter()
            .filter(|(key, _)| !NON_CHOICE_KEYS.contains(&key.to_lowercase().as_str()))
            .filter_map(|(key, value)| value.as_str().map(|text| (key.clone(), text.to_string())))
            .collect();

        match QuestionOptions::new(choices, correct.to_string()) {
            Ok(options) => Some(options),
            Err(e) => {
                tracing::warn!("skipping generated multiple-choice question: {e}");
                return None;
            }
        }
    } else {
        None
    };

    let difficulty = object
        .get("difficulty")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(GeneratedQuestion {
        text: text.to_string(),
        question_type,
        options,
        difficulty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// LLM that replays a canned response
    struct CannedLlm {
        response: String,
    }

    #[async_trait]
    impl LlmProvider for CannedLlm {
        async fn generate(&self, _prompt: &str, _task: LlmTask) -> Result<String> {
            Ok(self.response.clone())
        }

        fn name(&self) -> &str {
            "canned"
        }

        fn model(&self) -> &str {
            "canned-1"
        }
    }

    fn generator(response: &str) -> QuestionGenerator {
        QuestionGenerator::new(Arc::new(CannedLlm {
            response: response.to_string(),
        }))
    }

    const VALID_ARRAY: &str = r#"[
        {"question_text": "What is the capital of France?",
         "question_type": "multiple_choice",
         "options": {"A": "Berlin", "B": "Paris", "correct": "B"},
         "difficulty": "easy"},
        {"question_text": "Explain photosynthesis.",
         "question_type": "short_answer"}
    ]"#;

    #[test]
    fn fenced_array_parses_like_bare_array() {
        let bare = extract_json_elements(VALID_ARRAY).unwrap();
        let fenced = extract_json_elements(&format!("```json\n{VALID_ARRAY}\n```")).unwrap();
        let plain_fence = extract_json_elements(&format!("```\n{VALID_ARRAY}\n```")).unwrap();
        assert_eq!(bare, fenced);
        assert_eq!(bare, plain_fence);
    }

    #[test]
    fn array_is_recovered_from_surrounding_prose() {
        let wrapped = format!("Here are your questions:\n{VALID_ARRAY}\nEnjoy!");
        let elements = extract_json_elements(&wrapped).unwrap();
        assert_eq!(elements.len(), 2);
    }

    #[test]
    fn lone_object_is_wrapped_as_singleton() {
        let raw = r#"Sure: {"question_text": "Q?", "question_type": "essay"}"#;
        let elements = extract_json_elements(raw).unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0]["question_type"], "essay");
    }

    #[test]
    fn garbage_yields_an_error() {
        assert!(extract_json_elements("I cannot answer that.").is_err());
        assert!(extract_json_elements("").is_err());
    }

    #[tokio::test]
    async fn valid_questions_survive_validation() {
        let questions = generator(VALID_ARRAY)
            .generate("source text", 2, &[QuestionType::MultipleChoice])
            .await
            .unwrap();

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question_type, QuestionType::MultipleChoice);
        let options = questions[0].options.as_ref().unwrap();
        assert_eq!(options.correct, "B");
        assert_eq!(options.choices.len(), 2);
        assert_eq!(questions[1].options, None);
        assert_eq!(questions[0].difficulty.as_deref(), Some("easy"));
    }

    #[tokio::test]
    async fn mcq_without_correct_key_is_dropped() {
        let response = r#"[
            {"question_text": "Broken?", "question_type": "multiple_choice",
             "options": {"A": "x", "B": "y"}},
            {"question_text": "Fine.", "question_type": "essay"}
        ]"#;
        let questions = generator(response)
            .generate("text", 2, &[QuestionType::MultipleChoice, QuestionType::Essay])
            .await
            .unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].text, "Fine.");
    }

    #[tokio::test]
    async fn only_invalid_elements_is_an_error_carrying_raw_output() {
        let response = r#"[{"question_text": "Broken?", "question_type": "multiple_choice",
                            "options": {"A": "x"}}]"#;
        let err = generator(response)
            .generate("text", 1, &[QuestionType::MultipleChoice])
            .await
            .unwrap_err();

        match err {
            Error::UnusableModelOutput { raw, .. } => assert!(raw.contains("Broken?")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_source_text_is_rejected_without_llm_call() {
        let err = generator("[]")
            .generate("   ", 3, &[QuestionType::Essay])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
