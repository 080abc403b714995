//! Core data types: documents, chunks, exams, feedback

pub mod document;
pub mod exam;
pub mod feedback;

pub use document::{Chunk, SourceFormat, StudyDocument};
pub use exam::{Answer, Attempt, AttemptStatus, Question, QuestionOptions, QuestionType};
pub use feedback::FeedbackRecord;
