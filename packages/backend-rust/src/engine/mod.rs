//! Learning engine: the synchronous operations behind the HTTP surface.
//!
//! Owns the process-wide, read-only competency graph and quiz catalog, and talks
//! to the mastery, profile and content stores through their traits. Every
//! mutation of mastery goes through [`MasteryStore::update_mastery`], one call
//! per accepted observation, followed by one progress-history entry.

mod config;
mod quiz;
mod resources;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use skillpath_algo::sanitize::{clamp_unit, validate_signal, validate_threshold};
use skillpath_algo::{
    detect_gaps_detailed, score_of, CompetencyGraph, CompetencyId, Difficulty, Gap,
    GradeResult, LearningPathPlanner, MasteryEstimator, MasteryRecord, MasterySnapshot,
    NotFoundError, PathStep, PerformancePredictor, PlanError, QuizAttempt, ValidationError,
};

use crate::catalog::QuizCatalog;
use crate::content::{ContentStore, RankedDocument};
use crate::store::{
    now_ms, LearnerProfile, MasteryStore, ProfileStore, ProgressEntry, ProgressSource,
    ProgressStatus, StoreError,
};

pub use config::EngineConfig;
pub use quiz::QuizEngine;
pub use resources::LearningStyle;

/// How much a practice item's difficulty above the midpoint discounts its score.
const INTERACTION_DIFFICULTY_WEIGHT: f64 = 0.2;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PlanError> for EngineError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::Validation(err) => EngineError::Validation(err),
            PlanError::NotFound(err) => EngineError::NotFound(err),
        }
    }
}

// ==================== Outputs ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedStep {
    #[serde(flatten)]
    pub step: PathStep,
    pub name: String,
    pub objectives: Vec<String>,
    pub resources: Vec<RankedDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPlan {
    pub user_id: String,
    pub learner_level: Difficulty,
    pub style: Option<LearningStyle>,
    pub steps: Vec<PlannedStep>,
}

impl LearningPlan {
    pub fn competency_ids(&self) -> Vec<&str> {
        self.steps
            .iter()
            .map(|s| s.step.competency_id.as_str())
            .collect()
    }
}

/// A frontier gap with what to study for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemediationHint {
    pub competency_id: CompetencyId,
    pub name: String,
    pub score: f64,
    pub objectives: Vec<String>,
    /// Quizzes that exercise the competency.
    pub quizzes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeOutcome {
    pub result: GradeResult,
    pub mastery: MasteryRecord,
    pub remediation: Vec<RemediationHint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub competency_id: CompetencyId,
    pub mastery: f64,
    pub difficulty: Difficulty,
    pub probability: f64,
}

/// Path request; fields left out fall back to the user's saved profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathOptions {
    pub targets: Vec<String>,
    pub level: Option<Difficulty>,
    pub style: Option<LearningStyle>,
}

/// New profile contents; `goals` must name known competencies.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub level: Difficulty,
    pub style: Option<LearningStyle>,
    pub goals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyObjectives {
    pub competency_id: CompetencyId,
    pub name: String,
    pub objectives: Vec<String>,
}

// ==================== Engine ====================

#[derive(Clone)]
pub struct LearningEngine {
    graph: Arc<CompetencyGraph>,
    quiz_engine: QuizEngine,
    store: Arc<dyn MasteryStore>,
    profiles: Arc<dyn ProfileStore>,
    content: Arc<dyn ContentStore>,
    config: EngineConfig,
    estimator: MasteryEstimator,
    predictor: PerformancePredictor,
}

impl LearningEngine {
    pub fn new(
        graph: CompetencyGraph,
        quizzes: QuizCatalog,
        store: Arc<dyn MasteryStore>,
        profiles: Arc<dyn ProfileStore>,
        content: Arc<dyn ContentStore>,
        config: EngineConfig,
    ) -> Self {
        let estimator = MasteryEstimator::new(config.ewma_alpha);
        let quiz_engine = QuizEngine::new(Arc::new(quizzes), estimator, Arc::clone(&store));
        Self {
            graph: Arc::new(graph),
            quiz_engine,
            store,
            profiles,
            content,
            config,
            estimator,
            predictor: PerformancePredictor::new(config.predictor),
        }
    }

    pub fn graph(&self) -> &CompetencyGraph {
        &self.graph
    }

    pub fn quizzes(&self) -> &QuizCatalog {
        self.quiz_engine.catalog()
    }

    /// Prerequisite-ordered path to `targets`, with resources attached to every step.
    pub fn generate_path<S: AsRef<str>>(
        &self,
        user_id: &str,
        targets: &[S],
        learner_level: Difficulty,
        style: Option<LearningStyle>,
    ) -> Result<LearningPlan, EngineError> {
        let snapshot = self.store.read_mastery(user_id)?;
        let planner =
            LearningPathPlanner::new(&self.graph, self.predictor, self.config.planner());
        let path = planner.generate_path(&snapshot, targets, learner_level)?;

        let steps = path
            .steps
            .into_iter()
            .map(|step| {
                let (name, objectives) = match self.graph.get(&step.competency_id) {
                    Some(c) => (c.name.clone(), c.objectives.clone()),
                    None => (step.competency_id.clone(), Vec::new()),
                };
                let resources = resources::recommend(
                    self.content.as_ref(),
                    &step.competency_id,
                    step.is_gap,
                    style,
                    self.config.resources_per_step,
                );
                PlannedStep {
                    step,
                    name,
                    objectives,
                    resources,
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            user_id = %user_id,
            level = %learner_level,
            steps = steps.len(),
            "learning path generated"
        );

        Ok(LearningPlan {
            user_id: user_id.to_string(),
            learner_level,
            style,
            steps,
        })
    }

    /// Path request resolved against the saved profile: explicit targets, level
    /// and style win; missing ones come from the profile, then from defaults.
    pub fn plan(&self, user_id: &str, options: PathOptions) -> Result<LearningPlan, EngineError> {
        let needs_profile =
            options.targets.is_empty() || options.level.is_none() || options.style.is_none();
        let profile = if needs_profile {
            self.profiles.read_profile(user_id)?
        } else {
            None
        };

        let targets = match (options.targets.is_empty(), &profile) {
            (true, Some(profile)) => profile.goals.clone(),
            _ => options.targets,
        };
        let level = options
            .level
            .or(profile.as_ref().map(|p| p.level))
            .unwrap_or_default();
        let style = options.style.or(profile.as_ref().and_then(|p| p.style));

        self.generate_path(user_id, targets.as_slice(), level, style)
    }

    /// Grade a quiz attempt, update mastery, and report the user's remaining gaps.
    ///
    /// Once mastery is committed the call succeeds; a failure to read back the
    /// snapshot only leaves the remediation list empty.
    pub fn grade(&self, user_id: &str, attempt: &QuizAttempt) -> Result<GradeOutcome, EngineError> {
        let (result, mastery) = self.quiz_engine.grade_and_record(user_id, attempt)?;
        self.record_progress(
            user_id,
            &result.competency,
            ProgressSource::Quiz,
            Some(result.quiz_id.as_str()),
            result.raw_score,
            &mastery,
        );

        let remediation = match self.store.read_mastery(user_id) {
            Ok(snapshot) => self.remediation_hints(&snapshot, self.config.gap_threshold),
            Err(err) => {
                tracing::warn!(user_id = %user_id, error = %err, "remediation skipped");
                Vec::new()
            }
        };
        Ok(GradeOutcome {
            result,
            mastery,
            remediation,
        })
    }

    /// Fold a non-quiz observation into mastery.
    ///
    /// `score` and `difficulty` are both in [0, 1]; work above the 0.5 midpoint
    /// counts for slightly less.
    pub fn record_interaction(
        &self,
        user_id: &str,
        competency_id: &str,
        score: f64,
        difficulty: f64,
    ) -> Result<MasteryRecord, EngineError> {
        let competency = self.graph.require(competency_id)?;
        let score = validate_signal(score)?;
        let difficulty = validate_signal(difficulty)?;
        let signal = clamp_unit(score - (difficulty - 0.5) * INTERACTION_DIFFICULTY_WEIGHT);

        let estimator = self.estimator;
        let record = self.store.update_mastery(
            user_id,
            &competency.id,
            &mut |current: &MasteryRecord| estimator.apply(current, signal, now_ms()),
        )?;
        self.record_progress(
            user_id,
            &competency.id,
            ProgressSource::Interaction,
            None,
            signal,
            &record,
        );

        tracing::info!(
            user_id = %user_id,
            competency = %competency.id,
            signal,
            mastery = record.score,
            "interaction recorded"
        );
        Ok(record)
    }

    /// Frontier gaps with scores; `threshold` defaults to the configured gap threshold.
    pub fn detect_gaps(&self, user_id: &str, threshold: Option<f64>) -> Result<Vec<Gap>, EngineError> {
        let threshold = match threshold {
            Some(t) => validate_threshold(t)?,
            None => self.config.gap_threshold,
        };
        let snapshot = self.store.read_mastery(user_id)?;
        Ok(detect_gaps_detailed(&snapshot, &self.graph, threshold))
    }

    /// Probability of success on `competency_id` at `difficulty` (its base level by default).
    pub fn predict(
        &self,
        user_id: &str,
        competency_id: &str,
        difficulty: Option<Difficulty>,
    ) -> Result<Prediction, EngineError> {
        let competency = self.graph.require(competency_id)?;
        let snapshot = self.store.read_mastery(user_id)?;
        let mastery = score_of(&snapshot, &competency.id);
        let difficulty = difficulty.unwrap_or(competency.base_difficulty);
        Ok(Prediction {
            competency_id: competency.id.clone(),
            mastery,
            difficulty,
            probability: self
                .predictor
                .predict_at(mastery, competency.base_difficulty, difficulty),
        })
    }

    pub fn mastery_snapshot(&self, user_id: &str) -> Result<MasterySnapshot, EngineError> {
        Ok(self.store.read_mastery(user_id)?)
    }

    pub fn reset_user(&self, user_id: &str) -> Result<bool, EngineError> {
        let removed = self.store.reset_user(user_id)?;
        tracing::info!(user_id = %user_id, removed, "mastery reset");
        Ok(removed)
    }

    pub fn profile(&self, user_id: &str) -> Result<LearnerProfile, EngineError> {
        self.profiles
            .read_profile(user_id)?
            .ok_or_else(|| NotFoundError {
                kind: "profile",
                id: user_id.to_string(),
            })
            .map_err(EngineError::from)
    }

    /// Replace the user's profile. Goals are checked against the catalog and
    /// deduplicated in order.
    pub fn save_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> Result<LearnerProfile, EngineError> {
        let mut goals: Vec<CompetencyId> = Vec::with_capacity(update.goals.len());
        for goal in &update.goals {
            let competency = self.graph.require(goal)?;
            if !goals.contains(&competency.id) {
                goals.push(competency.id.clone());
            }
        }

        let profile = LearnerProfile {
            level: update.level,
            style: update.style,
            goals,
            updated_at: now_ms(),
        };
        self.profiles.write_profile(user_id, &profile)?;
        tracing::info!(
            user_id = %user_id,
            level = %profile.level,
            goals = profile.goals.len(),
            "profile saved"
        );
        Ok(profile)
    }

    /// Accepted observations, newest first.
    pub fn history(&self, user_id: &str, limit: usize) -> Result<Vec<ProgressEntry>, EngineError> {
        Ok(self.profiles.read_history(user_id, limit)?)
    }

    /// Objectives of `targets` and all their prerequisites, prerequisites first.
    pub fn objectives_for<S: AsRef<str>>(
        &self,
        targets: &[S],
    ) -> Result<Vec<CompetencyObjectives>, EngineError> {
        if targets.is_empty() {
            return Err(ValidationError::EmptyTargets.into());
        }
        Ok(self
            .graph
            .closure_of(targets)?
            .into_iter()
            .map(|c| CompetencyObjectives {
                competency_id: c.id.clone(),
                name: c.name.clone(),
                objectives: c.objectives.clone(),
            })
            .collect())
    }

    /// Mastery is already committed here, so a history failure is logged, not returned.
    fn record_progress(
        &self,
        user_id: &str,
        competency_id: &str,
        source: ProgressSource,
        quiz_id: Option<&str>,
        signal: f64,
        record: &MasteryRecord,
    ) {
        let entry = ProgressEntry {
            competency_id: competency_id.to_string(),
            status: ProgressStatus::classify(record, self.config.high_mastery),
            source,
            quiz_id: quiz_id.map(str::to_string),
            signal,
            mastery: record.score,
            timestamp: record.last_updated,
        };
        if let Err(err) = self.profiles.append_history(user_id, &entry) {
            tracing::warn!(
                user_id = %user_id,
                competency = %competency_id,
                error = %err,
                "progress entry not recorded"
            );
        }
    }

    fn remediation_hints(&self, snapshot: &MasterySnapshot, threshold: f64) -> Vec<RemediationHint> {
        detect_gaps_detailed(snapshot, &self.graph, threshold)
            .into_iter()
            .filter_map(|gap| {
                let competency = self.graph.get(&gap.competency_id)?;
                Some(RemediationHint {
                    competency_id: gap.competency_id,
                    name: competency.name.clone(),
                    score: gap.score,
                    objectives: competency.objectives.clone(),
                    quizzes: self
                        .quizzes()
                        .for_competency(&competency.id)
                        .map(|pack| pack.id.clone())
                        .collect(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::NoContent;
    use crate::store::{InMemoryMasteryStore, InMemoryProfileStore};
    use skillpath_algo::Competency;

    fn engine() -> LearningEngine {
        let graph = CompetencyGraph::build(vec![
            Competency::new("arrays", Difficulty::Beginner).with_objectives(["index"]),
            Competency::new("linked-lists", Difficulty::Beginner).with_prerequisites(["arrays"]),
        ])
        .unwrap();
        LearningEngine::new(
            graph,
            QuizCatalog::new(),
            Arc::new(InMemoryMasteryStore::new()),
            Arc::new(InMemoryProfileStore::new()),
            Arc::new(NoContent),
            EngineConfig::default(),
        )
    }

    fn update(level: Difficulty, goals: &[&str]) -> ProfileUpdate {
        ProfileUpdate {
            level,
            style: Some(LearningStyle::Auditory),
            goals: goals.iter().map(|g| g.to_string()).collect(),
        }
    }

    #[test]
    fn test_interaction_signal_discounts_hard_work() {
        let engine = engine();
        let record = engine.record_interaction("u1", "arrays", 0.8, 1.0).unwrap();
        assert!((record.score - 0.7).abs() < 1e-12);
        assert_eq!(record.observation_count, 1);

        let easy = engine.record_interaction("u2", "arrays", 1.0, 0.0).unwrap();
        assert_eq!(easy.score, 1.0);
    }

    #[test]
    fn test_interaction_rejects_bad_input_without_mutation() {
        let engine = engine();
        assert!(matches!(
            engine.record_interaction("u1", "arrays", 1.5, 0.5),
            Err(EngineError::Validation(ValidationError::SignalOutOfRange(_)))
        ));
        assert!(matches!(
            engine.record_interaction("u1", "heaps", 0.5, 0.5),
            Err(EngineError::NotFound(_))
        ));
        assert!(engine.mastery_snapshot("u1").unwrap().is_empty());
    }

    #[test]
    fn test_predict_defaults_to_base_level() {
        let engine = engine();
        let prediction = engine.predict("u1", "arrays", None).unwrap();
        assert_eq!(prediction.difficulty, Difficulty::Beginner);
        assert_eq!(prediction.mastery, 0.0);
        assert!(prediction.probability > 0.0 && prediction.probability < 0.5);
    }

    #[test]
    fn test_objectives_follow_closure_order() {
        let engine = engine();
        let objectives = engine.objectives_for(&["linked-lists"]).unwrap();
        assert_eq!(objectives.len(), 2);
        assert_eq!(objectives[0].competency_id, "arrays");
        assert_eq!(objectives[0].objectives, vec!["index".to_string()]);
        assert!(matches!(
            engine.objectives_for::<&str>(&[]),
            Err(EngineError::Validation(ValidationError::EmptyTargets))
        ));
    }

    #[test]
    fn test_gaps_threshold_validated() {
        let engine = engine();
        assert_eq!(engine.detect_gaps("u1", None).unwrap().len(), 1);
        assert!(matches!(
            engine.detect_gaps("u1", Some(f64::NAN)),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_plan_falls_back_to_saved_profile() {
        let engine = engine();
        assert!(matches!(
            engine.plan("u1", PathOptions::default()),
            Err(EngineError::Validation(ValidationError::EmptyTargets))
        ));

        engine
            .save_profile("u1", update(Difficulty::Advanced, &["linked-lists"]))
            .unwrap();
        let plan = engine.plan("u1", PathOptions::default()).unwrap();
        assert_eq!(plan.competency_ids(), vec!["arrays", "linked-lists"]);
        assert_eq!(plan.learner_level, Difficulty::Advanced);
        assert_eq!(plan.style, Some(LearningStyle::Auditory));

        let explicit = engine
            .plan(
                "u1",
                PathOptions {
                    targets: vec!["arrays".into()],
                    level: Some(Difficulty::Beginner),
                    style: None,
                },
            )
            .unwrap();
        assert_eq!(explicit.competency_ids(), vec!["arrays"]);
        assert_eq!(explicit.learner_level, Difficulty::Beginner);
        assert_eq!(explicit.style, Some(LearningStyle::Auditory));
    }

    #[test]
    fn test_save_profile_validates_goals() {
        let engine = engine();
        assert!(matches!(
            engine.save_profile("u1", update(Difficulty::Beginner, &["heaps"])),
            Err(EngineError::NotFound(_))
        ));
        assert!(matches!(
            engine.profile("u1"),
            Err(EngineError::NotFound(NotFoundError { kind: "profile", .. }))
        ));

        let saved = engine
            .save_profile("u1", update(Difficulty::Beginner, &["arrays", "arrays"]))
            .unwrap();
        assert_eq!(saved.goals, vec!["arrays".to_string()]);
        assert_eq!(engine.profile("u1").unwrap(), saved);
    }

    #[test]
    fn test_history_records_accepted_interactions_only() {
        let engine = engine();
        engine.record_interaction("u1", "arrays", 0.4, 0.5).unwrap();
        engine.record_interaction("u1", "arrays", 1.0, 0.5).unwrap();
        assert!(engine.record_interaction("u1", "arrays", 2.0, 0.5).is_err());

        let history = engine.history("u1", 10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].source, ProgressSource::Interaction);
        assert_eq!(history[0].signal, 1.0);
        assert!((history[0].mastery - 0.58).abs() < 1e-12);
        assert_eq!(history[0].status, ProgressStatus::InProgress);
        assert_eq!(history[1].status, ProgressStatus::Started);
        assert!(engine.history("u2", 10).unwrap().is_empty());
    }
}
