//! Learning Path Planner
//!
//! Turns a set of target competencies into a prerequisite-ordered study sequence.
//! Each step carries a recommended difficulty, the predicted probability of
//! succeeding at it, and whether the competency is a frontier gap.
//!
//! The planner is a pure function of (graph, mastery snapshot, targets, level):
//! it reads nothing else and writes nothing.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, ValidationError};
use crate::gaps::detect_gaps;
use crate::graph::CompetencyGraph;
use crate::predictor::PerformancePredictor;
use crate::types::{
    score_of, Difficulty, LearningPath, MasterySnapshot, PathStep, DEFAULT_GAP_THRESHOLD,
    DEFAULT_HIGH_MASTERY,
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerConfig {
    pub gap_threshold: f64,
    pub high_mastery: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            gap_threshold: DEFAULT_GAP_THRESHOLD,
            high_mastery: DEFAULT_HIGH_MASTERY,
        }
    }
}

pub struct LearningPathPlanner<'g> {
    graph: &'g CompetencyGraph,
    predictor: PerformancePredictor,
    config: PlannerConfig,
}

impl<'g> LearningPathPlanner<'g> {
    pub fn new(
        graph: &'g CompetencyGraph,
        predictor: PerformancePredictor,
        config: PlannerConfig,
    ) -> Self {
        Self {
            graph,
            predictor,
            config,
        }
    }

    /// Difficulty to study a competency at, given its base level and the learner.
    ///
    /// - weak (below the gap threshold): one level easier than base
    /// - strong (at or above the high-mastery mark): one level above the learner
    /// - otherwise: base level
    pub fn recommend_difficulty(
        &self,
        base: Difficulty,
        learner_level: Difficulty,
        mastery: f64,
    ) -> Difficulty {
        if mastery < self.config.gap_threshold {
            base.easier()
        } else if mastery >= self.config.high_mastery {
            learner_level.harder()
        } else {
            base
        }
    }

    pub fn generate_path<S: AsRef<str>>(
        &self,
        snapshot: &MasterySnapshot,
        targets: &[S],
        learner_level: Difficulty,
    ) -> Result<LearningPath, PlanError> {
        if targets.is_empty() {
            return Err(ValidationError::EmptyTargets.into());
        }

        let closure = self.graph.closure_of(targets)?;
        let gaps: HashSet<String> = detect_gaps(snapshot, self.graph, self.config.gap_threshold)
            .into_iter()
            .collect();

        let steps = closure
            .into_iter()
            .map(|competency| {
                let mastery = score_of(snapshot, &competency.id);
                let recommended =
                    self.recommend_difficulty(competency.base_difficulty, learner_level, mastery);
                PathStep {
                    competency_id: competency.id.clone(),
                    mastery,
                    recommended_difficulty: recommended,
                    predicted_success_probability: self.predictor.predict_at(
                        mastery,
                        competency.base_difficulty,
                        recommended,
                    ),
                    is_gap: gaps.contains(&competency.id),
                }
            })
            .collect();

        Ok(LearningPath { steps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotFoundError;
    use crate::types::{Competency, MasteryRecord};

    fn graph() -> CompetencyGraph {
        CompetencyGraph::build(vec![
            Competency::new("arrays", Difficulty::Beginner),
            Competency::new("linked-lists", Difficulty::Intermediate).with_prerequisites(["arrays"]),
            Competency::new("trees", Difficulty::Advanced).with_prerequisites(["linked-lists"]),
            Competency::new("stacks", Difficulty::Beginner).with_prerequisites(["arrays"]),
        ])
        .unwrap()
    }

    fn snapshot(scores: &[(&str, f64)]) -> MasterySnapshot {
        scores
            .iter()
            .map(|&(id, score)| {
                (
                    id.to_string(),
                    MasteryRecord {
                        score,
                        observation_count: 3,
                        last_updated: 0,
                    },
                )
            })
            .collect()
    }

    fn planner(graph: &CompetencyGraph) -> LearningPathPlanner<'_> {
        LearningPathPlanner::new(graph, PerformancePredictor::default(), PlannerConfig::default())
    }

    #[test]
    fn test_chain_scenario_order() {
        let graph = graph();
        let path = planner(&graph)
            .generate_path(&MasterySnapshot::new(), &["trees"], Difficulty::Beginner)
            .unwrap();
        assert_eq!(path.competency_ids(), vec!["arrays", "linked-lists", "trees"]);
        // nothing observed yet: only the root is an actionable gap
        assert_eq!(path.gap_ids(), vec!["arrays"]);
    }

    #[test]
    fn test_difficulty_recommendations() {
        let graph = graph();
        let snap = snapshot(&[("arrays", 0.9), ("linked-lists", 0.7), ("trees", 0.2)]);
        let path = planner(&graph)
            .generate_path(&snap, &["trees"], Difficulty::Intermediate)
            .unwrap();

        let levels: Vec<Difficulty> = path.steps.iter().map(|s| s.recommended_difficulty).collect();
        assert_eq!(
            levels,
            vec![
                Difficulty::Advanced,     // strong: learner level + 1
                Difficulty::Intermediate, // middling: base
                Difficulty::Intermediate, // weak: base - 1
            ]
        );
        assert_eq!(path.gap_ids(), vec!["trees"]);
    }

    #[test]
    fn test_harder_recommendation_is_capped() {
        let graph = graph();
        let p = planner(&graph);
        assert_eq!(
            p.recommend_difficulty(Difficulty::Beginner, Difficulty::Advanced, 0.95),
            Difficulty::Advanced
        );
        assert_eq!(
            p.recommend_difficulty(Difficulty::Beginner, Difficulty::Beginner, 0.1),
            Difficulty::Beginner
        );
    }

    #[test]
    fn test_probability_matches_predictor() {
        let graph = graph();
        let snap = snapshot(&[("arrays", 0.85)]);
        let path = planner(&graph)
            .generate_path(&snap, &["arrays"], Difficulty::Beginner)
            .unwrap();
        let step = &path.steps[0];
        let expected = PerformancePredictor::default().predict(0.85, 1);
        assert_eq!(step.recommended_difficulty, Difficulty::Intermediate);
        assert_eq!(step.predicted_success_probability, expected);
    }

    #[test]
    fn test_idempotent() {
        let graph = graph();
        let snap = snapshot(&[("arrays", 0.65), ("stacks", 0.3)]);
        let p = planner(&graph);
        let first = p
            .generate_path(&snap, &["trees", "stacks"], Difficulty::Beginner)
            .unwrap();
        let second = p
            .generate_path(&snap, &["stacks", "trees"], Difficulty::Beginner)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_target_fails() {
        let graph = graph();
        let err = planner(&graph)
            .generate_path(&MasterySnapshot::new(), &["trees", "heaps"], Difficulty::Beginner)
            .unwrap_err();
        assert_eq!(err, PlanError::NotFound(NotFoundError::competency("heaps")));
    }

    #[test]
    fn test_empty_targets_fail() {
        let graph = graph();
        let none: [&str; 0] = [];
        let err = planner(&graph)
            .generate_path(&MasterySnapshot::new(), &none, Difficulty::Beginner)
            .unwrap_err();
        assert_eq!(err, PlanError::Validation(ValidationError::EmptyTargets));
    }
}
