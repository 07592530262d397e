//! Data Sanitization
//!
//! Numerical guards applied at the edges of the mastery and prediction models.
//!
//! Functions:
//! - Unit-interval clamping for mastery values
//! - Probability clamping away from exact 0/1
//! - Signal validation for externally supplied observations

use crate::error::ValidationError;
use crate::types::PROBABILITY_EPSILON;

/// Whether a slice contains NaN or infinite values
pub fn has_invalid_values(arr: &[f64]) -> bool {
    arr.iter().any(|&x| x.is_nan() || x.is_infinite())
}

/// Clamp to [0, 1]; NaN collapses to 0
pub fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Clamp to [EPSILON, 1 - EPSILON]; NaN collapses to 0.5
pub fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.5
    } else {
        p.clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON)
    }
}

/// Accept an observed signal only if it is finite and inside [0, 1]
pub fn validate_signal(signal: f64) -> Result<f64, ValidationError> {
    if signal.is_finite() && (0.0..=1.0).contains(&signal) {
        Ok(signal)
    } else {
        Err(ValidationError::SignalOutOfRange(signal))
    }
}

/// Validate a mastery threshold supplied by a caller
pub fn validate_threshold(threshold: f64) -> Result<f64, ValidationError> {
    validate_signal(threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_invalid_values() {
        assert!(!has_invalid_values(&[0.0, 0.5, 1.0]));
        assert!(has_invalid_values(&[0.0, f64::NAN]));
        assert!(has_invalid_values(&[f64::INFINITY]));
    }

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(1.0000001), 1.0);
        assert_eq!(clamp_unit(-0.2), 0.0);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
        assert_eq!(clamp_unit(0.42), 0.42);
    }

    #[test]
    fn test_clamp_probability_never_hits_bounds() {
        assert!(clamp_probability(1.0) < 1.0);
        assert!(clamp_probability(0.0) > 0.0);
        assert_eq!(clamp_probability(f64::NAN), 0.5);
    }

    #[test]
    fn test_validate_signal() {
        assert_eq!(validate_signal(0.0), Ok(0.0));
        assert_eq!(validate_signal(1.0), Ok(1.0));
        assert!(validate_signal(1.01).is_err());
        assert!(validate_signal(-0.01).is_err());
        assert!(validate_signal(f64::NAN).is_err());
        assert!(validate_signal(f64::INFINITY).is_err());
    }
}
