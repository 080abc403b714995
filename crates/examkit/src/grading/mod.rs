//! AI-assisted exam grading

mod engine;
mod submission;

pub use engine::{AnswerGrader, GradeRequest, GradeResult};
pub use submission::{SubmissionGrader, SubmittedAnswer};
