//! LLM answer evaluation with structured-output parsing
//!
//! The grading prompt asks the model to finish with a line of the exact
//! form `Awarded Points: X`; that line is the contract between the prompt
//! and the parser. Everything else in the response is feedback.

use std::sync::Arc;

use crate::generation::PromptBuilder;
use crate::providers::{LlmProvider, LlmTask};
use crate::types::{QuestionOptions, QuestionType};

/// Points-line prefix the parser matches, case-insensitively
const POINTS_PREFIX: &str = "awarded points:";

/// One answer to evaluate
#[derive(Debug)]
pub struct GradeRequest<'a> {
    /// Question text
    pub question_text: &'a str,
    /// Question kind
    pub question_type: QuestionType,
    /// The user's answer: verbatim text for subjective questions, the
    /// rendered option text for multiple choice
    pub answer_text: &'a str,
    /// Maximum points for the question
    pub max_points: f64,
    /// Choices shown to the user (multiple choice only)
    pub options: Option<&'a QuestionOptions>,
    /// Source-material context to validate against, when available
    pub context_text: Option<&'a str>,
}

/// Outcome of grading one answer.
///
/// `points_awarded` is `Some` with a value clamped to `[0, max_points]`
/// when the model determined points (or the engine short-circuited to
/// zero); `None` means the caller must determine points itself, which is
/// always the case for multiple choice.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeResult {
    /// Feedback text; never blank
    pub feedback: String,
    /// Points determined by the engine, if any
    pub points_awarded: Option<f64>,
}

/// Grades answers through the LLM gateway
pub struct AnswerGrader {
    llm: Arc<dyn LlmProvider>,
}

impl AnswerGrader {
    /// Create a grader over the given LLM gateway
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Grade one answer.
    ///
    /// A blank answer short-circuits to zero points without calling the
    /// model. A gateway failure degrades to zero points with an explanatory
    /// feedback string rather than an error, so one bad call never blocks a
    /// submission.
    pub async fn grade(&self, request: &GradeRequest<'_>) -> GradeResult {
        if request.answer_text.trim().is_empty() {
            tracing::info!(
                question = %truncate(request.question_text, 50),
                "no answer provided; skipping model call"
            );
            return GradeResult {
                feedback: "No answer provided by the user.".to_string(),
                points_awarded: Some(0.0),
            };
        }

        let prompt = PromptBuilder::build_grading_prompt(
            request.question_text,
            request.question_type,
            request.answer_text,
            request.max_points,
            request.options,
            request.context_text,
        );

        match self.llm.generate(&prompt, LlmTask::GradeAnswer).await {
            Ok(raw) => parse_grading_response(&raw, request.question_type, request.max_points),
            Err(e) => {
                tracing::error!(
                    question = %truncate(request.question_text, 50),
                    "model call failed during grading: {e}"
                );
                GradeResult {
                    feedback: format!("Automated grading failed due to an AI service error: {e}"),
                    points_awarded: Some(0.0),
                }
            }
        }
    }
}

/// Split a raw model response into feedback and an optional points value.
fn parse_grading_response(
    raw: &str,
    question_type: QuestionType,
    max_points: f64,
) -> GradeResult {
    let mut feedback_lines: Vec<&str> = Vec::new();
    let mut parsed_points: Option<f64> = None;

    for line in raw.lines() {
        let normalized = line.trim().to_lowercase();
        if let Some(rest) = normalized.strip_prefix(POINTS_PREFIX) {
            match rest.trim().parse::<f64>() {
                Ok(value) => {
                    let clamped = value.clamp(0.0, max_points);
                    tracing::debug!(value, clamped, "parsed awarded points line");
                    parsed_points = Some(clamped);
                }
                Err(_) => {
                    tracing::warn!(line, "could not parse points from model line; dropping it");
                }
            }
        } else {
            feedback_lines.push(line);
        }
    }

    let mut feedback = feedback_lines.join("\n").trim().to_string();
    if feedback.is_empty() {
        feedback = match (question_type, parsed_points.is_some()) {
            (QuestionType::ShortAnswer | QuestionType::Essay, true) => {
                "Grading complete. Please review the awarded points.".to_string()
            }
            (QuestionType::MultipleChoice, _) => "Feedback for your choice.".to_string(),
            _ => "AI feedback could not be fully parsed or was not provided.".to_string(),
        };
        if question_type.is_subjective() && parsed_points.is_none() {
            feedback.push_str(" Points could not be determined by AI.");
        }
    }

    // Multiple-choice points are computed locally, never taken from the
    // model, so the engine reports "caller decides".
    let points_awarded = if question_type.is_subjective() {
        parsed_points
    } else {
        None
    };

    GradeResult {
        feedback,
        points_awarded,
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedLlm {
        response: std::result::Result<&'static str, &'static str>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LlmProvider for CannedLlm {
        async fn generate(&self, _prompt: &str, _task: LlmTask) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.response {
                Ok(text) => Ok(text.to_string()),
                Err(msg) => Err(Error::Llm(msg.to_string())),
            }
        }

        fn name(&self) -> &str {
            "canned"
        }

        fn model(&self) -> &str {
            "canned-1"
        }
    }

    fn grader_with(
        response: std::result::Result<&'static str, &'static str>,
    ) -> (AnswerGrader, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let grader = AnswerGrader::new(Arc::new(CannedLlm {
            response,
            calls: calls.clone(),
        }));
        (grader, calls)
    }

    fn subjective_request(answer: &'static str, max_points: f64) -> GradeRequest<'static> {
        GradeRequest {
            question_text: "Define osmosis.",
            question_type: QuestionType::ShortAnswer,
            answer_text: answer,
            max_points,
            options: None,
            context_text: None,
        }
    }

    #[tokio::test]
    async fn blank_answer_short_circuits_without_model_call() {
        let (grader, calls) = grader_with(Ok("unused"));

        let result = grader.grade(&subjective_request("   ", 10.0)).await;

        assert_eq!(result.points_awarded, Some(0.0));
        assert_eq!(result.feedback, "No answer provided by the user.");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn points_are_parsed_and_clamped() {
        let (grader, _) = grader_with(Ok("Good coverage of the mechanism.\nAwarded Points: 999"));

        let result = grader.grade(&subjective_request("water moves", 10.0)).await;

        assert_eq!(result.points_awarded, Some(10.0));
        assert_eq!(result.feedback, "Good coverage of the mechanism.");
    }

    #[tokio::test]
    async fn negative_points_clamp_to_zero() {
        let (grader, _) = grader_with(Ok("Weak.\nAwarded Points: -3"));

        let result = grader.grade(&subjective_request("answer", 10.0)).await;
        assert_eq!(result.points_awarded, Some(0.0));
    }

    #[tokio::test]
    async fn points_line_is_case_insensitive_and_excluded_from_feedback() {
        let (grader, _) = grader_with(Ok("Solid answer.\n  AWARDED POINTS: 7.5  \nKeep it up."));

        let result = grader.grade(&subjective_request("answer", 10.0)).await;

        assert_eq!(result.points_awarded, Some(7.5));
        assert_eq!(result.feedback, "Solid answer.\nKeep it up.");
    }

    #[tokio::test]
    async fn unparseable_points_line_is_dropped_and_points_stay_undetermined() {
        let (grader, _) = grader_with(Ok("Awarded Points: several\nNice try."));

        let result = grader.grade(&subjective_request("answer", 10.0)).await;

        assert_eq!(result.points_awarded, None);
        assert_eq!(result.feedback, "Nice try.");
    }

    #[tokio::test]
    async fn empty_feedback_gets_placeholder() {
        let (grader, _) = grader_with(Ok("Awarded Points: 4"));

        let result = grader.grade(&subjective_request("answer", 10.0)).await;

        assert_eq!(result.points_awarded, Some(4.0));
        assert_eq!(
            result.feedback,
            "Grading complete. Please review the awarded points."
        );
    }

    #[tokio::test]
    async fn multiple_choice_never_takes_model_points() {
        let (grader, _) = grader_with(Ok("That option confuses mass and weight.\nAwarded Points: 5"));

        let result = grader
            .grade(&GradeRequest {
                question_text: "Which unit measures mass?",
                question_type: QuestionType::MultipleChoice,
                answer_text: "Newton",
                max_points: 5.0,
                options: None,
                context_text: None,
            })
            .await;

        assert_eq!(result.points_awarded, None);
        assert_eq!(result.feedback, "That option confuses mass and weight.");
    }

    #[tokio::test]
    async fn gateway_failure_degrades_to_zero_points() {
        let (grader, _) = grader_with(Err("backend down"));

        let result = grader.grade(&subjective_request("answer", 10.0)).await;

        assert_eq!(result.points_awarded, Some(0.0));
        assert!(result.feedback.starts_with("Automated grading failed"));
    }
}
