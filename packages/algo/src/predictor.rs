//! Performance Predictor
//!
//! Logistic model of success probability:
//! `sigmoid(w_m * mastery - w_d * offset + bias)` where `offset` is how many
//! levels the requested difficulty sits above the competency's base level.

use serde::{Deserialize, Serialize};

use crate::sanitize::{clamp_probability, has_invalid_values};
use crate::types::{
    Difficulty, PREDICTOR_BIAS, PREDICTOR_DIFFICULTY_WEIGHT, PREDICTOR_MASTERY_WEIGHT,
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictorWeights {
    pub mastery: f64,
    pub difficulty: f64,
    pub bias: f64,
}

impl Default for PredictorWeights {
    fn default() -> Self {
        Self {
            mastery: PREDICTOR_MASTERY_WEIGHT,
            difficulty: PREDICTOR_DIFFICULTY_WEIGHT,
            bias: PREDICTOR_BIAS,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformancePredictor {
    weights: PredictorWeights,
}

impl PerformancePredictor {
    /// Negative weights are zeroed; non-finite weights fall back to the defaults.
    pub fn new(weights: PredictorWeights) -> Self {
        if has_invalid_values(&[weights.mastery, weights.difficulty, weights.bias]) {
            return Self::default();
        }
        Self {
            weights: PredictorWeights {
                mastery: weights.mastery.max(0.0),
                difficulty: weights.difficulty.max(0.0),
                bias: weights.bias,
            },
        }
    }

    pub fn weights(&self) -> PredictorWeights {
        self.weights
    }

    /// Success probability in (0, 1).
    pub fn predict(&self, mastery: f64, difficulty_offset: i32) -> f64 {
        let w = &self.weights;
        let logit = w.mastery * mastery - w.difficulty * difficulty_offset as f64 + w.bias;
        clamp_probability(sigmoid(logit))
    }

    /// Success probability for a `requested` level on a competency based at `base`.
    pub fn predict_at(&self, mastery: f64, base: Difficulty, requested: Difficulty) -> f64 {
        self.predict(mastery, requested.offset_from(base))
    }
}

/// Logistic function, evaluated on the side that cannot overflow
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint() {
        let predictor = PerformancePredictor::default();
        assert!((predictor.predict(0.5, 0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_monotonic_in_mastery() {
        let predictor = PerformancePredictor::default();
        for offset in -2..=2 {
            let mut previous = 0.0;
            for step in 0..=20 {
                let p = predictor.predict(step as f64 / 20.0, offset);
                assert!(p > previous, "offset {offset}, step {step}");
                previous = p;
            }
        }
    }

    #[test]
    fn test_monotonic_in_difficulty() {
        let predictor = PerformancePredictor::default();
        for mastery in [0.0, 0.3, 0.6, 1.0] {
            let easier = predictor.predict(mastery, -1);
            let same = predictor.predict(mastery, 0);
            let harder = predictor.predict(mastery, 1);
            let hardest = predictor.predict(mastery, 2);
            assert!(easier > same && same > harder && harder > hardest);
        }
    }

    #[test]
    fn test_never_exactly_zero_or_one() {
        let predictor = PerformancePredictor::new(PredictorWeights {
            mastery: 1e6,
            difficulty: 1e6,
            bias: 0.0,
        });
        let high = predictor.predict(1.0, -2);
        let low = predictor.predict(0.0, 2);
        assert!(high < 1.0 && high > 0.5);
        assert!(low > 0.0 && low < 0.5);
    }

    #[test]
    fn test_predict_at_uses_offset() {
        let predictor = PerformancePredictor::default();
        assert_eq!(
            predictor.predict_at(0.7, Difficulty::Beginner, Difficulty::Advanced),
            predictor.predict(0.7, 2)
        );
    }

    #[test]
    fn test_non_finite_weights_fall_back() {
        let predictor = PerformancePredictor::new(PredictorWeights {
            mastery: f64::NAN,
            difficulty: 1.0,
            bias: 0.0,
        });
        assert_eq!(predictor.weights(), PredictorWeights::default());
    }

    #[test]
    fn test_sigmoid_extremes_are_finite() {
        assert!(sigmoid(-1000.0).is_finite());
        assert!(sigmoid(1000.0).is_finite());
    }
}
