//! Per-submission grading orchestration
//!
//! Multiple-choice questions are scored locally against the designated
//! correct key; the AI evaluator is consulted only for explanatory
//! feedback, and any points it reports are discarded. Short-answer and
//! essay questions adopt the AI-determined points. The attempt's score and
//! status are finalized only after every answer is persisted.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::storage::{ChunkStore, ExamStore};
use crate::types::{Answer, Attempt, AttemptStatus, Question, QuestionType};

use super::{AnswerGrader, GradeRequest};

/// One answer as submitted by the user
#[derive(Debug, Clone)]
pub struct SubmittedAnswer {
    /// Question being answered
    pub question_id: Uuid,
    /// Free-text answer (short answer / essay)
    pub answer_text: Option<String>,
    /// Selected choice key (multiple choice)
    pub selected_choice: Option<String>,
}

/// Grades whole exam submissions
pub struct SubmissionGrader {
    exams: Arc<dyn ExamStore>,
    chunks: Arc<dyn ChunkStore>,
    grader: AnswerGrader,
}

impl SubmissionGrader {
    /// Create a submission grader
    pub fn new(exams: Arc<dyn ExamStore>, chunks: Arc<dyn ChunkStore>, grader: AnswerGrader) -> Self {
        Self {
            exams,
            chunks,
            grader,
        }
    }

    /// Grade all submitted answers for an in-progress attempt, persist them,
    /// and finalize the attempt: score is the sum of non-null points and the
    /// status transitions to completed with an end timestamp.
    pub async fn grade_submission(
        &self,
        attempt_id: Uuid,
        submitted: &[SubmittedAnswer],
    ) -> Result<Attempt> {
        let mut attempt = self
            .exams
            .attempt(attempt_id)
            .await
            .ok_or_else(|| Error::Storage(format!("unknown attempt {attempt_id}")))?;

        if attempt.status != AttemptStatus::InProgress {
            return Err(Error::InvalidInput(format!(
                "attempt {attempt_id} is not in progress"
            )));
        }

        let mut answers = Vec::new();
        for item in submitted {
            let Some(question) = self.exams.question(item.question_id).await else {
                tracing::warn!(question_id = %item.question_id, "submitted answer references unknown question; skipping");
                continue;
            };
            answers.push(self.grade_one(attempt_id, &question, item).await);
        }

        self.exams.save_answers(&answers).await?;

        let persisted = self.exams.answers_for_attempt(attempt_id).await;
        let score: f64 = persisted.iter().filter_map(|a| a.points_awarded).sum();

        attempt.score = Some(score);
        attempt.status = AttemptStatus::Completed;
        attempt.completed_at = Some(Utc::now());
        self.exams.save_attempt(&attempt).await?;

        tracing::info!(%attempt_id, score, answers = persisted.len(), "attempt graded");
        Ok(attempt)
    }

    async fn grade_one(
        &self,
        attempt_id: Uuid,
        question: &Question,
        item: &SubmittedAnswer,
    ) -> Answer {
        let answer_text = item.answer_text.clone().unwrap_or_default();
        let mut points = 0.0;
        let mut is_correct: Option<bool> = None;

        // What the AI evaluator sees: the verbatim text for subjective
        // questions, the rendered text of the selected option for MCQs.
        let mut graded_content = answer_text.clone();

        if question.question_type == QuestionType::MultipleChoice {
            match &question.options {
                Some(options) => {
                    let selected = item.selected_choice.as_deref();
                    if selected == Some(options.correct.as_str()) {
                        is_correct = Some(true);
                        points = question.points;
                    } else {
                        is_correct = Some(false);
                        points = 0.0;
                    }
                    graded_content = match selected {
                        Some(key) => options
                            .choice_text(key)
                            .map(str::to_string)
                            .unwrap_or_else(|| key.to_string()),
                        None => String::new(),
                    };
                }
                None => {
                    tracing::warn!(question_id = %question.id, "multiple-choice question has no options; awarding 0");
                }
            }
        }

        let context_text = match question.source_chunk_id {
            Some(chunk_id) => self.chunks.chunk(chunk_id).await.map(|c| c.text),
            None => None,
        };

        let mut feedback = String::new();
        if !graded_content.trim().is_empty() || question.question_type.is_subjective() {
            let result = self
                .grader
                .grade(&GradeRequest {
                    question_text: &question.text,
                    question_type: question.question_type,
                    answer_text: &graded_content,
                    max_points: question.points,
                    options: question.options.as_ref(),
                    context_text: context_text.as_deref(),
                })
                .await;
            feedback = result.feedback;

            // AI-determined points are authoritative for subjective answers
            // only; for MCQs the engine returns None and local scoring wins.
            if question.question_type.is_subjective() {
                if let Some(ai_points) = result.points_awarded {
                    points = ai_points;
                    is_correct = Some(points >= question.points / 2.0);
                }
            }
        }

        Answer::new(
            attempt_id,
            question.id,
            item.answer_text.clone(),
            item.selected_choice.clone(),
            is_correct,
            Some(points),
            feedback,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{LlmProvider, LlmTask};
    use crate::storage::{MemoryChunkStore, MemoryExamStore};
    use crate::types::{Chunk, QuestionOptions};
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Evaluator that awards 90% of the maximum and records its prompts.
    struct GenerousLlm {
        prompts: Mutex<Vec<String>>,
    }

    impl GenerousLlm {
        fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for GenerousLlm {
        async fn generate(&self, prompt: &str, _task: LlmTask) -> crate::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let max_points: f64 = prompt
                .lines()
                .find_map(|line| {
                    line.strip_prefix("The question is worth ")?
                        .strip_suffix(" points.")?
                        .parse()
                        .ok()
                })
                .unwrap_or(0.0);
            Ok(format!(
                "Well argued overall.\nAwarded Points: {}",
                max_points * 0.9
            ))
        }

        fn name(&self) -> &str {
            "generous"
        }

        fn model(&self) -> &str {
            "generous-1"
        }
    }

    fn capital_question(exam_id: Uuid, points: f64) -> Question {
        let options = QuestionOptions::new(
            BTreeMap::from([
                ("A".to_string(), "Berlin".to_string()),
                ("B".to_string(), "Paris".to_string()),
                ("C".to_string(), "Rome".to_string()),
            ]),
            "B".to_string(),
        )
        .unwrap();
        Question::multiple_choice(exam_id, "Capital of France?".to_string(), points, 0, options)
    }

    struct Fixture {
        exams: Arc<MemoryExamStore>,
        chunks: Arc<MemoryChunkStore>,
        llm: Arc<GenerousLlm>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                exams: Arc::new(MemoryExamStore::new()),
                chunks: Arc::new(MemoryChunkStore::new()),
                llm: Arc::new(GenerousLlm::new()),
            }
        }

        fn grader(&self) -> SubmissionGrader {
            SubmissionGrader::new(
                self.exams.clone(),
                self.chunks.clone(),
                AnswerGrader::new(self.llm.clone()),
            )
        }
    }

    #[tokio::test]
    async fn correct_choice_gets_full_points() {
        let fixture = Fixture::new();
        let exam_id = Uuid::new_v4();
        let question = capital_question(exam_id, 5.0);
        let question_id = question.id;
        fixture.exams.insert_question(question).await.unwrap();

        let attempt = Attempt::new(exam_id);
        fixture.exams.save_attempt(&attempt).await.unwrap();

        let graded = fixture
            .grader()
            .grade_submission(
                attempt.id,
                &[SubmittedAnswer {
                    question_id,
                    answer_text: None,
                    selected_choice: Some("B".to_string()),
                }],
            )
            .await
            .unwrap();

        assert_eq!(graded.score, Some(5.0));
        let answers = fixture.exams.answers_for_attempt(attempt.id).await;
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].is_correct, Some(true));
        assert_eq!(answers[0].points_awarded, Some(5.0));
        // The AI saw the rendered option text, not the key.
        let prompts = fixture.llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("User's Answer/Selected Option: 'Paris'"));
    }

    #[tokio::test]
    async fn wrong_choice_gets_zero_despite_ai_generosity() {
        let fixture = Fixture::new();
        let exam_id = Uuid::new_v4();
        let question = capital_question(exam_id, 5.0);
        let question_id = question.id;
        fixture.exams.insert_question(question).await.unwrap();

        let attempt = Attempt::new(exam_id);
        fixture.exams.save_attempt(&attempt).await.unwrap();

        let graded = fixture
            .grader()
            .grade_submission(
                attempt.id,
                &[SubmittedAnswer {
                    question_id,
                    answer_text: None,
                    selected_choice: Some("A".to_string()),
                }],
            )
            .await
            .unwrap();

        // The evaluator's "Awarded Points" line is discarded for MCQs.
        assert_eq!(graded.score, Some(0.0));
        let answers = fixture.exams.answers_for_attempt(attempt.id).await;
        assert_eq!(answers[0].is_correct, Some(false));
        assert!(!answers[0].feedback.is_empty());
    }

    #[tokio::test]
    async fn subjective_answers_adopt_ai_points_and_derive_correctness() {
        let fixture = Fixture::new();
        let exam_id = Uuid::new_v4();
        let question = Question::subjective(
            exam_id,
            "Explain osmosis.".to_string(),
            QuestionType::ShortAnswer,
            10.0,
            0,
        );
        let question_id = question.id;
        fixture.exams.insert_question(question).await.unwrap();

        let attempt = Attempt::new(exam_id);
        fixture.exams.save_attempt(&attempt).await.unwrap();

        let graded = fixture
            .grader()
            .grade_submission(
                attempt.id,
                &[SubmittedAnswer {
                    question_id,
                    answer_text: Some("Water crosses a semipermeable membrane.".to_string()),
                    selected_choice: None,
                }],
            )
            .await
            .unwrap();

        assert_eq!(graded.score, Some(9.0));
        let answers = fixture.exams.answers_for_attempt(attempt.id).await;
        assert_eq!(answers[0].points_awarded, Some(9.0));
        // 9.0 >= 10.0 / 2.0
        assert_eq!(answers[0].is_correct, Some(true));
    }

    #[tokio::test]
    async fn grading_context_comes_from_the_linked_chunk() {
        let fixture = Fixture::new();
        let exam_id = Uuid::new_v4();

        let chunk = Chunk::new(
            Uuid::new_v4(),
            0,
            "Osmosis moves solvent toward higher solute concentration.".to_string(),
            "vec-ctx".to_string(),
            "unit".to_string(),
        );
        let chunk_id = chunk.id;
        fixture.chunks.insert_chunks(&[chunk]).await.unwrap();

        let question = Question::subjective(
            exam_id,
            "Explain osmosis.".to_string(),
            QuestionType::Essay,
            10.0,
            0,
        )
        .with_source_chunk(chunk_id);
        let question_id = question.id;
        fixture.exams.insert_question(question).await.unwrap();

        let attempt = Attempt::new(exam_id);
        fixture.exams.save_attempt(&attempt).await.unwrap();

        fixture
            .grader()
            .grade_submission(
                attempt.id,
                &[SubmittedAnswer {
                    question_id,
                    answer_text: Some("It moves water.".to_string()),
                    selected_choice: None,
                }],
            )
            .await
            .unwrap();

        let prompts = fixture.llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("Relevant Context from Study Material"));
        assert!(prompts[0].contains("higher solute concentration"));
    }

    #[tokio::test]
    async fn unknown_question_ids_are_skipped() {
        let fixture = Fixture::new();
        let exam_id = Uuid::new_v4();
        let attempt = Attempt::new(exam_id);
        fixture.exams.save_attempt(&attempt).await.unwrap();

        let graded = fixture
            .grader()
            .grade_submission(
                attempt.id,
                &[SubmittedAnswer {
                    question_id: Uuid::new_v4(),
                    answer_text: Some("orphan".to_string()),
                    selected_choice: None,
                }],
            )
            .await
            .unwrap();

        assert_eq!(graded.score, Some(0.0));
        assert!(fixture.exams.answers_for_attempt(attempt.id).await.is_empty());
    }

    #[tokio::test]
    async fn completed_attempts_cannot_be_resubmitted() {
        let fixture = Fixture::new();
        let mut attempt = Attempt::new(Uuid::new_v4());
        attempt.status = AttemptStatus::Completed;
        fixture.exams.save_attempt(&attempt).await.unwrap();

        let err = fixture
            .grader()
            .grade_submission(attempt.id, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn mixed_attempt_sums_mcq_and_ai_points() {
        let fixture = Fixture::new();
        let exam_id = Uuid::new_v4();

        let mcq = capital_question(exam_id, 10.0);
        let mcq_id = mcq.id;
        fixture.exams.insert_question(mcq).await.unwrap();

        let essay = Question::subjective(
            exam_id,
            "Discuss the water cycle.".to_string(),
            QuestionType::Essay,
            20.0,
            1,
        );
        let essay_id = essay.id;
        fixture.exams.insert_question(essay).await.unwrap();

        let attempt = Attempt::new(exam_id);
        fixture.exams.save_attempt(&attempt).await.unwrap();

        let graded = fixture
            .grader()
            .grade_submission(
                attempt.id,
                &[
                    SubmittedAnswer {
                        question_id: mcq_id,
                        answer_text: None,
                        selected_choice: Some("B".to_string()),
                    },
                    SubmittedAnswer {
                        question_id: essay_id,
                        answer_text: Some("Evaporation, condensation, precipitation.".to_string()),
                        selected_choice: None,
                    },
                ],
            )
            .await
            .unwrap();

        // 10 for the correct MCQ plus 18 (90% of 20) from the evaluator.
        assert_eq!(graded.score, Some(28.0));
        assert_eq!(graded.status, AttemptStatus::Completed);
        assert!(graded.completed_at.is_some());
    }
}
