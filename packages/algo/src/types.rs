//! Common Types and Constants
//!
//! Shared data structures used across all algorithm modules.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ==================== Constants ====================

/// EWMA smoothing factor for mastery updates
pub const DEFAULT_EWMA_ALPHA: f64 = 0.3;

/// Mastery strictly below this value marks a competency as weak
pub const DEFAULT_GAP_THRESHOLD: f64 = 0.6;

/// Mastery at or above this value earns a harder recommendation
pub const DEFAULT_HIGH_MASTERY: f64 = 0.8;

/// Logistic weight on mastery
pub const PREDICTOR_MASTERY_WEIGHT: f64 = 6.0;

/// Logistic weight on the (negated) difficulty offset
pub const PREDICTOR_DIFFICULTY_WEIGHT: f64 = 1.5;

/// Logistic bias; with the weights above, mastery 0.5 at the base level predicts 0.5
pub const PREDICTOR_BIAS: f64 = -3.0;

/// Predicted probabilities are kept inside [EPSILON, 1 - EPSILON]
pub const PROBABILITY_EPSILON: f64 = 1e-9;

/// Competency identifier
pub type CompetencyId = String;

/// Per-user view of mastery, keyed by competency id
pub type MasterySnapshot = HashMap<CompetencyId, MasteryRecord>;

// ==================== Difficulty ====================

/// Ordinal difficulty level shared by competencies, quizzes and learners
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn ordinal(self) -> i32 {
        match self {
            Difficulty::Beginner => 0,
            Difficulty::Intermediate => 1,
            Difficulty::Advanced => 2,
        }
    }

    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        match ordinal {
            0 => Some(Difficulty::Beginner),
            1 => Some(Difficulty::Intermediate),
            2 => Some(Difficulty::Advanced),
            _ => None,
        }
    }

    /// One level easier, floored at beginner
    pub fn easier(self) -> Self {
        Self::from_ordinal(self.ordinal() - 1).unwrap_or(Difficulty::Beginner)
    }

    /// One level harder, capped at advanced
    pub fn harder(self) -> Self {
        Self::from_ordinal(self.ordinal() + 1).unwrap_or(Difficulty::Advanced)
    }

    /// Ordinal distance from `base`; positive means harder than base
    pub fn offset_from(self, base: Difficulty) -> i32 {
        self.ordinal() - base.ordinal()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" | "easy" => Ok(Difficulty::Beginner),
            "intermediate" | "mid" | "medium" => Ok(Difficulty::Intermediate),
            "advanced" | "hard" => Ok(Difficulty::Advanced),
            other => Err(ValidationError::UnknownDifficulty(other.to_string())),
        }
    }
}

// ==================== Catalog Types ====================

/// Immutable catalog entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competency {
    pub id: CompetencyId,
    pub name: String,
    /// Ids of competencies that must be mastered first
    pub prerequisites: BTreeSet<CompetencyId>,
    pub objectives: Vec<String>,
    pub base_difficulty: Difficulty,
}

impl Competency {
    pub fn new(id: impl Into<String>, base_difficulty: Difficulty) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            prerequisites: BTreeSet::new(),
            objectives: Vec::new(),
            base_difficulty,
        }
    }

    pub fn with_prerequisites<I, S>(mut self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prerequisites = prerequisites.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_objectives<I, S>(mut self, objectives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.objectives = objectives.into_iter().map(Into::into).collect();
        self
    }
}

// ==================== Mastery Types ====================

/// Mastery state of one (user, competency) pair
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryRecord {
    /// Mastery estimate in [0, 1]
    pub score: f64,
    /// Number of observations folded into `score`
    pub observation_count: u32,
    /// Last update (unix millis)
    pub last_updated: i64,
}

impl MasteryRecord {
    /// Record created lazily on first observation
    pub fn fresh(now_ms: i64) -> Self {
        Self {
            score: 0.0,
            observation_count: 0,
            last_updated: now_ms,
        }
    }
}

/// Mastery of `id` in a snapshot, 0 when the user has never been observed on it
pub fn score_of(snapshot: &MasterySnapshot, id: &str) -> f64 {
    snapshot.get(id).map(|record| record.score).unwrap_or(0.0)
}

// ==================== Path Types ====================

/// One step of a learning path
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStep {
    pub competency_id: CompetencyId,
    pub mastery: f64,
    pub recommended_difficulty: Difficulty,
    pub predicted_success_probability: f64,
    pub is_gap: bool,
}

/// Ordered study sequence, prerequisites first
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPath {
    pub steps: Vec<PathStep>,
}

impl LearningPath {
    pub fn competency_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.competency_id.as_str()).collect()
    }

    pub fn gap_ids(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.is_gap)
            .map(|s| s.competency_id.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
