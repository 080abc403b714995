//! Exam questions, submitted answers, and attempts

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Kind of exam question
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    ShortAnswer,
    Essay,
}

impl QuestionType {
    /// Parse the wire form used in model output and stored records
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "multiple_choice" => Some(Self::MultipleChoice),
            "short_answer" => Some(Self::ShortAnswer),
            "essay" => Some(Self::Essay),
            _ => None,
        }
    }

    /// Wire form of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple_choice",
            Self::ShortAnswer => "short_answer",
            Self::Essay => "essay",
        }
    }

    /// Whether answers of this type are graded by the AI evaluator rather
    /// than by key comparison
    pub fn is_subjective(&self) -> bool {
        matches!(self, Self::ShortAnswer | Self::Essay)
    }
}

/// Choices for a multiple-choice question plus the designated correct key.
///
/// The correct key is validated against the choice keys at construction, so
/// a value of this type always satisfies the invariant that the correct
/// answer is one of the offered options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionOptions {
    /// Choice key to rendered choice text
    pub choices: BTreeMap<String, String>,
    /// Key of the correct choice
    pub correct: String,
}

impl QuestionOptions {
    /// Create options, rejecting a correct key that names no choice
    pub fn new(choices: BTreeMap<String, String>, correct: String) -> Result<Self> {
        if !choices.contains_key(&correct) {
            return Err(Error::InvalidInput(format!(
                "correct key '{correct}' is not among the option keys"
            )));
        }
        Ok(Self { choices, correct })
    }

    /// Rendered text of a choice, if the key exists
    pub fn choice_text(&self, key: &str) -> Option<&str> {
        self.choices.get(key).map(String::as_str)
    }

    /// Render the choice list the way it is shown to the user, e.g.
    /// `A) Berlin B) Paris`
    pub fn render_list(&self) -> String {
        self.choices
            .iter()
            .map(|(key, text)| format!("{key}) {text}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// An exam question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique question ID
    pub id: Uuid,
    /// Owning exam
    pub exam_id: Uuid,
    /// Question text shown to the user
    pub text: String,
    /// Question kind
    pub question_type: QuestionType,
    /// Points this question is worth (positive)
    pub points: f64,
    /// Position within the exam
    pub order: u32,
    /// Choices and correct key (multiple choice only)
    pub options: Option<QuestionOptions>,
    /// Chunk this question was derived from, used as grading context
    pub source_chunk_id: Option<Uuid>,
}

impl Question {
    /// Create a multiple-choice question
    pub fn multiple_choice(
        exam_id: Uuid,
        text: String,
        points: f64,
        order: u32,
        options: QuestionOptions,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            exam_id,
            text,
            question_type: QuestionType::MultipleChoice,
            points,
            order,
            options: Some(options),
            source_chunk_id: None,
        }
    }

    /// Create a short-answer or essay question
    pub fn subjective(
        exam_id: Uuid,
        text: String,
        question_type: QuestionType,
        points: f64,
        order: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            exam_id,
            text,
            question_type,
            points,
            order,
            options: None,
            source_chunk_id: None,
        }
    }

    /// Attach the chunk the question was derived from
    pub fn with_source_chunk(mut self, chunk_id: Uuid) -> Self {
        self.source_chunk_id = Some(chunk_id);
        self
    }
}

/// A graded answer to one question within one attempt.
///
/// Created once per question per submission and immutable afterwards.
/// `points_awarded` is bounded to `[0, question.points]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Unique answer ID
    pub id: Uuid,
    /// Owning attempt
    pub attempt_id: Uuid,
    /// Question this answers
    pub question_id: Uuid,
    /// Free-text answer (short answer / essay)
    pub answer_text: Option<String>,
    /// Selected choice key (multiple choice)
    pub selected_choice: Option<String>,
    /// Correctness, where determinable
    pub is_correct: Option<bool>,
    /// Points awarded; `None` means no grade was recorded
    pub points_awarded: Option<f64>,
    /// Grading feedback
    pub feedback: String,
    /// When the answer was recorded
    pub answered_at: chrono::DateTime<chrono::Utc>,
}

impl Answer {
    /// Create a graded answer record
    pub fn new(
        attempt_id: Uuid,
        question_id: Uuid,
        answer_text: Option<String>,
        selected_choice: Option<String>,
        is_correct: Option<bool>,
        points_awarded: Option<f64>,
        feedback: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            attempt_id,
            question_id,
            answer_text,
            selected_choice,
            is_correct,
            points_awarded,
            feedback,
            answered_at: chrono::Utc::now(),
        }
    }
}

/// Lifecycle state of an exam attempt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,
    Completed,
    Abandoned,
}

/// One user's run through an exam
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    /// Unique attempt ID
    pub id: Uuid,
    /// Exam being attempted
    pub exam_id: Uuid,
    /// Lifecycle state
    pub status: AttemptStatus,
    /// Sum of non-null points across answers; set when grading completes
    pub score: Option<f64>,
    /// When the attempt started
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// When the attempt was completed
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Attempt {
    /// Start a new attempt
    pub fn new(exam_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            exam_id,
            status: AttemptStatus::InProgress,
            score: None,
            started_at: chrono::Utc::now(),
            completed_at: None,
        }
    }
}
