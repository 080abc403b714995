//! Prompt templates for the pipeline's LLM calls

use crate::types::{QuestionOptions, QuestionType};

/// Prompt builder for all generation tasks
pub struct PromptBuilder;

impl PromptBuilder {
    /// Context-grounded question answering
    pub fn build_qa_prompt(question: &str, context: &str) -> String {
        format!(
            r#"Answer the following question based on the provided context.
Question: {question}

Context:
{context}

Answer:"#
        )
    }

    /// Concise summarization
    pub fn build_summary_prompt(text: &str) -> String {
        format!(
            "Please provide a concise summary of the following text:\n\n---\n{text}\n---"
        )
    }

    /// Step-by-step explanation with optional context
    pub fn build_explanation_prompt(query: &str, context: Option<&str>) -> String {
        let mut parts = vec![
            "Please provide a detailed, step-by-step explanation for the following query or problem.".to_string(),
            format!("Query/Problem: {query}"),
        ];
        if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
            parts.push(format!("Use the following context if relevant: {context}"));
        }
        parts.push(
            "Break down your explanation into logical steps. Be clear and comprehensive. Use illustrative examples if helpful.".to_string(),
        );
        parts.join("\n\n")
    }

    /// Answer evaluation.
    ///
    /// Subjective questions instruct the model to finish with a line of the
    /// exact form `Awarded Points: X`; that line is the contract the grading
    /// parser relies on. Multiple-choice prompts request explanatory
    /// feedback only, since points are computed locally.
    pub fn build_grading_prompt(
        question_text: &str,
        question_type: QuestionType,
        answer_text: &str,
        max_points: f64,
        options: Option<&QuestionOptions>,
        context_text: Option<&str>,
    ) -> String {
        let mut parts = vec![
            "You are an AI grading assistant. Evaluate the user's answer for the following question.".to_string(),
            format!("Question: {question_text}"),
        ];

        if question_type == QuestionType::MultipleChoice {
            if let Some(options) = options {
                parts.push(format!("Options provided to user: {}", options.render_list()));
            }
            parts.push(format!("User's Answer/Selected Option: '{answer_text}'"));
        } else {
            parts.push(format!("User's Answer: {answer_text}"));
        }

        if let Some(context) = context_text.filter(|c| !c.trim().is_empty()) {
            parts.push(format!(
                "Relevant Context from Study Material (use this to validate the answer if applicable): {context}"
            ));
        }

        parts.push(format!("The question is worth {max_points} points."));

        if question_type.is_subjective() {
            parts.push(format!(
                "Provide constructive feedback on the user's answer. \
                 Then, on a new line, strictly output 'Awarded Points: X' where X is the number of points awarded out of {max_points}. \
                 X should be an integer or a float (e.g., Awarded Points: {}). \
                 Base your grading on accuracy, completeness, and relevance to the question and provided context (if any).",
                max_points / 2.0
            ));
        } else {
            parts.push(
                "Provide a brief explanation for why the user's selection might be correct or incorrect, \
                 or offer additional insights related to the question and options. \
                 Do not award points for multiple-choice questions in your response."
                    .to_string(),
            );
        }

        parts.join("\n\n")
    }

    /// Exam question authoring. Requests a well-formed JSON array of
    /// question objects and nothing else.
    pub fn build_question_generation_prompt(
        source_text: &str,
        count: usize,
        allowed_types: &[QuestionType],
    ) -> String {
        let type_list = allowed_types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"Given the following text, please generate {count} exam questions.
The questions should be of the following types: {type_list}.

For each question, provide:
1. The question text.
2. The question type (e.g., 'multiple_choice', 'short_answer', 'essay').
3. For 'multiple_choice' questions, provide 3-4 options and indicate the correct answer key (e.g., A, B, C, D). Options should be a dictionary like {{"A": "Option A", "B": "Option B", "correct": "A"}}.
4. The difficulty level (e.g., 'easy', 'medium', 'hard'). This is optional but preferred.

Format the output as a JSON list of objects, where each object represents a question.
Example for a single multiple-choice question:
{{
  "question_text": "What is the capital of France?",
  "question_type": "multiple_choice",
  "options": {{ "A": "Berlin", "B": "Madrid", "C": "Paris", "D": "Rome", "correct": "C" }},
  "difficulty": "easy"
}}
Example for a single short_answer question:
{{
  "question_text": "Explain the concept of photosynthesis in one sentence.",
  "question_type": "short_answer",
  "difficulty": "medium"
}}

--- TEXT FOR QUESTION GENERATION ---
{source_text}
--- END OF TEXT ---

Provide ONLY the JSON list of questions as your response. Ensure the JSON is well-formed."#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn grading_prompt_demands_points_line_for_subjective() {
        let prompt = PromptBuilder::build_grading_prompt(
            "Define osmosis.",
            QuestionType::ShortAnswer,
            "Movement of water across a membrane.",
            10.0,
            None,
            None,
        );
        assert!(prompt.contains("'Awarded Points: X'"));
        assert!(prompt.contains("out of 10"));
    }

    #[test]
    fn grading_prompt_forbids_points_for_multiple_choice() {
        let options = QuestionOptions::new(
            BTreeMap::from([
                ("A".to_string(), "Berlin".to_string()),
                ("B".to_string(), "Paris".to_string()),
            ]),
            "B".to_string(),
        )
        .unwrap();

        let prompt = PromptBuilder::build_grading_prompt(
            "Capital of France?",
            QuestionType::MultipleChoice,
            "Paris",
            5.0,
            Some(&options),
            None,
        );
        assert!(prompt.contains("Options provided to user: A) Berlin B) Paris"));
        assert!(prompt.contains("Do not award points"));
        assert!(!prompt.contains("Awarded Points:"));
    }
}
