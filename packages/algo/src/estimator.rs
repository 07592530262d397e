//! Mastery Estimator
//!
//! Exponentially weighted moving average over observed performance signals.
//! The first observation replaces the (meaningless) zero prior outright; every
//! later observation is blended in with weight `alpha`.

use serde::{Deserialize, Serialize};

use crate::sanitize::clamp_unit;
use crate::types::{MasteryRecord, DEFAULT_EWMA_ALPHA};

const MIN_ALPHA: f64 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MasteryEstimator {
    alpha: f64,
}

impl Default for MasteryEstimator {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_EWMA_ALPHA,
        }
    }
}

impl MasteryEstimator {
    /// `alpha` is clamped into (0, 1]; non-finite values fall back to the default.
    pub fn new(alpha: f64) -> Self {
        let alpha = if alpha.is_finite() {
            alpha.clamp(MIN_ALPHA, 1.0)
        } else {
            DEFAULT_EWMA_ALPHA
        };
        Self { alpha }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// New mastery after observing `signal` on top of `prior`.
    pub fn update(&self, prior: f64, observation_count: u32, signal: f64) -> f64 {
        if observation_count == 0 {
            return clamp_unit(signal);
        }
        clamp_unit(self.alpha * signal + (1.0 - self.alpha) * prior)
    }

    /// Fold one observation into a record, returning the successor record.
    pub fn apply(&self, record: &MasteryRecord, signal: f64, now_ms: i64) -> MasteryRecord {
        MasteryRecord {
            score: self.update(record.score, record.observation_count, signal),
            observation_count: record.observation_count.saturating_add(1),
            last_updated: now_ms,
        }
    }
}
