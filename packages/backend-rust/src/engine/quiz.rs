use std::sync::Arc;

use skillpath_algo::{grade, GradeResult, MasteryEstimator, MasteryRecord, QuizAttempt};

use super::EngineError;
use crate::catalog::QuizCatalog;
use crate::store::{now_ms, MasteryStore};

/// Grades attempts and folds the score into the user's mastery of the quiz's competency.
#[derive(Clone)]
pub struct QuizEngine {
    quizzes: Arc<QuizCatalog>,
    estimator: MasteryEstimator,
    store: Arc<dyn MasteryStore>,
}

impl QuizEngine {
    pub fn new(
        quizzes: Arc<QuizCatalog>,
        estimator: MasteryEstimator,
        store: Arc<dyn MasteryStore>,
    ) -> Self {
        Self {
            quizzes,
            estimator,
            store,
        }
    }

    pub fn catalog(&self) -> &QuizCatalog {
        &self.quizzes
    }

    /// Grade `attempt` for `user_id` and commit exactly one mastery update.
    ///
    /// Lookup and validation happen before the store is touched, so a rejected
    /// attempt leaves mastery unchanged.
    pub fn grade_and_record(
        &self,
        user_id: &str,
        attempt: &QuizAttempt,
    ) -> Result<(GradeResult, MasteryRecord), EngineError> {
        let pack = self.quizzes.require(&attempt.quiz_id)?;
        let result = grade(pack, attempt)?;

        let estimator = self.estimator;
        let signal = result.raw_score;
        let record = self.store.update_mastery(
            user_id,
            &pack.competency,
            &mut |current: &MasteryRecord| estimator.apply(current, signal, now_ms()),
        )?;

        tracing::info!(
            user_id = %user_id,
            quiz_id = %pack.id,
            competency = %pack.competency,
            raw_score = result.raw_score,
            mastery = record.score,
            "quiz graded"
        );
        Ok((result, record))
    }
}
