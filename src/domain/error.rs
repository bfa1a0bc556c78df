// ============================================================
// Layer 3 — Domain Errors
// ============================================================
// Typed failures raised by the pure domain and data code.
// The application layer lifts them into anyhow::Error at its
// boundary, so callers can still match on the variant when a
// failure is recoverable (a bad character typed at the prompt).

use thiserror::Error;

/// Failures while turning a digit string into a categorical tensor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid character {character:?} at position {position}: only digits 0-9 are allowed")]
    InvalidCharacter { character: char, position: usize },
}

/// Failures while building the (scalar, sequence) dataset.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatasetError {
    #[error("sample size {requested} exceeds total data size {available}")]
    SampleSizeExceedsPopulation { requested: usize, available: usize },

    #[error("input value {value:?} is not a non-negative integer")]
    InvalidScalar { value: String },

    #[error("input value {value} exceeds the normalization maximum {max}")]
    ScalarOutOfRange { value: u64, max: u64 },
}
