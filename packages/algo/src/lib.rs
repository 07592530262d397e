//! # skillpath-algo - competency learning core algorithms
//!
//! Pure Rust implementations of the learning-analytics models:
//!
//! - **Competency Graph** - prerequisite validation, cycle detection, topological order
//! - **Mastery Estimator** - EWMA blending of observed performance into mastery
//! - **Performance Predictor** - logistic success probability by mastery and difficulty
//! - **Gap Detector** - frontier of under-mastered competencies, weakest first
//! - **Learning Path Planner** - prerequisite-ordered, difficulty-annotated study paths
//! - **Quiz Grading** - answer-key scoring with strict attempt validation
//!
//! Everything here is deterministic and side-effect free; storage and locking
//! live in the backend crate.
//!
//! ## Modules
//!
//! - [`graph`] - competency prerequisite graph
//! - [`estimator`] - mastery update rule
//! - [`predictor`] - success probability model
//! - [`gaps`] - gap detection
//! - [`planner`] - learning path generation
//! - [`quiz`] - quiz packs and grading
//! - [`sanitize`] - numeric clamping and signal validation
//! - [`types`] - shared types and constants
//! - [`error`] - error taxonomy
//!
//! ## Example
//!
//! ```rust
//! use skillpath_algo::{
//!     CompetencyGraph, Competency, Difficulty, LearningPathPlanner, MasterySnapshot,
//!     PerformancePredictor, PlannerConfig,
//! };
//!
//! let graph = CompetencyGraph::build(vec![
//!     Competency::new("arrays", Difficulty::Beginner),
//!     Competency::new("linked-lists", Difficulty::Beginner).with_prerequisites(["arrays"]),
//!     Competency::new("trees", Difficulty::Intermediate).with_prerequisites(["linked-lists"]),
//! ])
//! .unwrap();
//!
//! let planner =
//!     LearningPathPlanner::new(&graph, PerformancePredictor::default(), PlannerConfig::default());
//! let path = planner
//!     .generate_path(&MasterySnapshot::new(), &["trees"], Difficulty::Beginner)
//!     .unwrap();
//! assert_eq!(path.competency_ids(), vec!["arrays", "linked-lists", "trees"]);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod error;
pub mod estimator;
pub mod gaps;
pub mod graph;
pub mod planner;
pub mod predictor;
pub mod quiz;
pub mod sanitize;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use error::{GraphError, NotFoundError, PlanError, ValidationError};

pub use estimator::MasteryEstimator;

pub use gaps::{detect_gaps, detect_gaps_detailed, Gap};

pub use graph::CompetencyGraph;

pub use planner::{LearningPathPlanner, PlannerConfig};

pub use predictor::{PerformancePredictor, PredictorWeights};

pub use quiz::{grade, GradeResult, QuestionResult, QuizAttempt, QuizPack, QuizQuestion};
