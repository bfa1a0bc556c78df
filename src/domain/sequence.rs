// ============================================================
// Layer 3 — Shared Sequence Configuration
// ============================================================
// The constants both phases must agree on:
//   - capacity L          (digits per sequence)
//   - number of classes   (always 10, one per decimal digit)
//   - normalization max   (scalar input divisor)
//
// One SequenceConfig is written next to the checkpoint before
// training starts and read back by the predictor, so the two
// phases can never disagree on L or on the scalar scale.

use serde::{Deserialize, Serialize};

use crate::domain::codec::{Codec, NUM_CLASSES};
use crate::domain::error::DatasetError;

pub const DEFAULT_CAPACITY: usize = 25;
pub const DEFAULT_NORMALIZATION_MAX: u64 = i64::MAX as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceConfig {
    pub capacity:          usize,
    pub num_classes:       usize,
    pub normalization_max: u64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl SequenceConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            num_classes:       NUM_CLASSES,
            normalization_max: DEFAULT_NORMALIZATION_MAX,
        }
    }

    /// The codec every encode/decode in a run must go through.
    pub fn codec(&self) -> Codec {
        Codec::new(self.capacity)
    }

    /// Parse the literal text of an `input` cell into a normalized scalar.
    pub fn parse_scalar(&self, text: &str) -> Result<ScalarInput, DatasetError> {
        let trimmed = text.trim();
        let raw: u64 = trimmed.parse().map_err(|_| DatasetError::InvalidScalar {
            value: text.to_string(),
        })?;
        ScalarInput::from_raw(raw, self)
    }
}

/// A non-negative integer mapped onto [0, 1] by the shared maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarInput(f64);

impl ScalarInput {
    pub fn from_raw(raw: u64, cfg: &SequenceConfig) -> Result<Self, DatasetError> {
        if raw > cfg.normalization_max {
            return Err(DatasetError::ScalarOutOfRange { value: raw, max: cfg.normalization_max });
        }
        Ok(Self(raw as f64 / cfg.normalization_max as f64))
    }

    /// Wrap an already-normalized value, clamped into [0, 1].
    pub fn from_normalized(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Map back onto the integer domain. Lossy: f64 carries 53 bits.
    pub fn to_raw(&self, cfg: &SequenceConfig) -> u64 {
        let scaled = (self.0 * cfg.normalization_max as f64).round();
        // `as` saturates, and 1.0 * max rounds one past i64::MAX in f64
        (scaled as u64).min(cfg.normalization_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_training_constants() {
        let cfg = SequenceConfig::default();
        assert_eq!(cfg.capacity, 25);
        assert_eq!(cfg.num_classes, 10);
        assert_eq!(cfg.normalization_max, 9_223_372_036_854_775_807);
    }

    #[test]
    fn test_parse_scalar_normalizes() {
        let cfg = SequenceConfig { normalization_max: 1000, ..SequenceConfig::default() };
        let x = cfg.parse_scalar("250").unwrap();
        assert!((x.value() - 0.25).abs() < 1e-12);
        assert_eq!(x.to_raw(&cfg), 250);
    }

    #[test]
    fn test_parse_scalar_rejects_bad_text() {
        let cfg = SequenceConfig::default();
        assert!(matches!(cfg.parse_scalar("-4"), Err(DatasetError::InvalidScalar { .. })));
        assert!(matches!(cfg.parse_scalar("12a"), Err(DatasetError::InvalidScalar { .. })));
    }

    #[test]
    fn test_scalar_above_max_is_rejected() {
        let cfg = SequenceConfig { normalization_max: 99, ..SequenceConfig::default() };
        assert_eq!(
            ScalarInput::from_raw(100, &cfg),
            Err(DatasetError::ScalarOutOfRange { value: 100, max: 99 })
        );
    }

    #[test]
    fn test_to_raw_saturates_at_max() {
        let cfg = SequenceConfig::default();
        assert_eq!(ScalarInput::from_normalized(1.0).to_raw(&cfg), cfg.normalization_max);
        assert_eq!(ScalarInput::from_normalized(-3.0).to_raw(&cfg), 0);
    }
}
