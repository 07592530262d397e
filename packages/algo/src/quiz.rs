//! Quiz packs and grading.
//!
//! Grading is pure: it scores an attempt against the pack's answer key and
//! returns per-question correctness. Recording the result is left to the caller.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::graph::CompetencyGraph;
use crate::types::{CompetencyId, Difficulty};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option_index: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizPack {
    pub id: String,
    pub title: String,
    pub competency: CompetencyId,
    pub level: Difficulty,
    pub questions: Vec<QuizQuestion>,
}

impl QuizPack {
    /// Structural checks: non-empty, ≥2 unique options per question, answer in range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.questions.is_empty() {
            return Err(ValidationError::EmptyQuiz {
                quiz: self.id.clone(),
            });
        }

        for (i, question) in self.questions.iter().enumerate() {
            if question.options.len() < 2 {
                return Err(ValidationError::TooFewOptions {
                    quiz: self.id.clone(),
                    question: i,
                    found: question.options.len(),
                });
            }

            let mut seen = HashSet::with_capacity(question.options.len());
            for option in &question.options {
                if !seen.insert(option.as_str()) {
                    return Err(ValidationError::DuplicateOption {
                        quiz: self.id.clone(),
                        question: i,
                        option: option.clone(),
                    });
                }
            }

            if question.correct_option_index >= question.options.len() {
                return Err(ValidationError::AnswerOutOfRange {
                    quiz: self.id.clone(),
                    question: i,
                    index: question.correct_option_index,
                    options: question.options.len(),
                });
            }
        }

        Ok(())
    }

    /// Structural checks plus: the target competency exists in `graph`.
    pub fn validate_against(&self, graph: &CompetencyGraph) -> Result<(), ValidationError> {
        if !graph.contains(&self.competency) {
            return Err(ValidationError::UnknownCompetency {
                quiz: self.id.clone(),
                competency: self.competency.clone(),
            });
        }
        self.validate()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub quiz_id: String,
    pub selected_indices: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub prompt: String,
    pub selected: usize,
    pub correct: usize,
    pub is_correct: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeResult {
    pub quiz_id: String,
    pub competency: CompetencyId,
    /// correct / total, in [0, 1]
    pub raw_score: f64,
    pub correct_count: usize,
    pub total: usize,
    pub questions: Vec<QuestionResult>,
}

/// Score `attempt` against `pack`.
///
/// Fails without side effects when the attempt belongs to another quiz, has the
/// wrong number of selections, or selects an option that does not exist.
pub fn grade(pack: &QuizPack, attempt: &QuizAttempt) -> Result<GradeResult, ValidationError> {
    if attempt.quiz_id != pack.id {
        return Err(ValidationError::QuizMismatch {
            pack: pack.id.clone(),
            attempt: attempt.quiz_id.clone(),
        });
    }
    if attempt.selected_indices.len() != pack.questions.len() {
        return Err(ValidationError::SelectionCountMismatch {
            expected: pack.questions.len(),
            got: attempt.selected_indices.len(),
        });
    }
    if pack.questions.is_empty() {
        return Err(ValidationError::EmptyQuiz {
            quiz: pack.id.clone(),
        });
    }

    let mut questions = Vec::with_capacity(pack.questions.len());
    for (i, (question, &selected)) in pack
        .questions
        .iter()
        .zip(&attempt.selected_indices)
        .enumerate()
    {
        if selected >= question.options.len() {
            return Err(ValidationError::SelectionOutOfRange {
                question: i,
                index: selected,
                options: question.options.len(),
            });
        }
        questions.push(QuestionResult {
            prompt: question.prompt.clone(),
            selected,
            correct: question.correct_option_index,
            is_correct: selected == question.correct_option_index,
        });
    }

    let correct_count = questions.iter().filter(|q| q.is_correct).count();
    let total = questions.len();

    Ok(GradeResult {
        quiz_id: pack.id.clone(),
        competency: pack.competency.clone(),
        raw_score: correct_count as f64 / total as f64,
        correct_count,
        total,
        questions,
    })
}
