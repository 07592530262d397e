use serde::{Deserialize, Serialize};
use skillpath_algo::{
    PlannerConfig, PredictorWeights, DEFAULT_EWMA_ALPHA, DEFAULT_GAP_THRESHOLD,
    DEFAULT_HIGH_MASTERY,
};

const DEFAULT_RESOURCES_PER_STEP: usize = 3;

/// Tunable thresholds and weights of the learning engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub ewma_alpha: f64,
    pub gap_threshold: f64,
    pub high_mastery: f64,
    pub predictor: PredictorWeights,
    pub resources_per_step: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ewma_alpha: DEFAULT_EWMA_ALPHA,
            gap_threshold: DEFAULT_GAP_THRESHOLD,
            high_mastery: DEFAULT_HIGH_MASTERY,
            predictor: PredictorWeights::default(),
            resources_per_step: DEFAULT_RESOURCES_PER_STEP,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(val) = unit_var("SKILLPATH_EWMA_ALPHA") {
            if val > 0.0 {
                config.ewma_alpha = val;
            } else {
                tracing::warn!(value = val, "SKILLPATH_EWMA_ALPHA must be positive, using default");
            }
        }
        if let Some(val) = unit_var("SKILLPATH_GAP_THRESHOLD") {
            config.gap_threshold = val;
        }
        if let Some(val) = unit_var("SKILLPATH_HIGH_MASTERY") {
            config.high_mastery = val;
        }
        if let Ok(val) = std::env::var("SKILLPATH_RESOURCES_PER_STEP") {
            match val.trim().parse::<usize>() {
                Ok(k) => config.resources_per_step = k,
                Err(_) => tracing::warn!(value = %val, "invalid SKILLPATH_RESOURCES_PER_STEP, using default"),
            }
        }

        if config.high_mastery < config.gap_threshold {
            tracing::warn!(
                gap_threshold = config.gap_threshold,
                high_mastery = config.high_mastery,
                "high-mastery mark below gap threshold, using default thresholds"
            );
            config.gap_threshold = DEFAULT_GAP_THRESHOLD;
            config.high_mastery = DEFAULT_HIGH_MASTERY;
        }

        config
    }

    pub fn planner(&self) -> PlannerConfig {
        PlannerConfig {
            gap_threshold: self.gap_threshold,
            high_mastery: self.high_mastery,
        }
    }
}

/// A `[0, 1]` value from the environment; anything else is ignored with a warning.
fn unit_var(key: &str) -> Option<f64> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<f64>() {
        Ok(val) if val.is_finite() && (0.0..=1.0).contains(&val) => Some(val),
        _ => {
            tracing::warn!(key, value = %raw, "expected a number in [0, 1], using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.ewma_alpha, 0.3);
        assert_eq!(config.gap_threshold, 0.6);
        assert_eq!(config.high_mastery, 0.8);
        assert_eq!(config.planner(), PlannerConfig::default());
    }
}
