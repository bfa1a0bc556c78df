// ============================================================
// Layer 3 — Raw Pair and Inversion Types
// ============================================================
// RawPair is one dataset row exactly as ingested: both columns
// kept as text so leading zeros in `output` survive.
// Inversion is what the predictor hands back for one query.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPair {
    /// Decimal integer that was fed to the opaque process
    pub input: String,

    /// Digit sequence the process emitted
    pub output: String,
}

impl RawPair {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input:  input.into(),
            output: output.into(),
        }
    }
}

/// The predicted pre-image of one digit sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Inversion {
    /// Recovered input integer
    pub input: u64,

    /// The same value in the normalized [0, 1] domain
    pub normalized: f64,

    /// Codec.decode of the model output at `normalized`
    pub reconstruction: String,

    /// Mean per-position cross-entropy against the query sequence
    pub loss: f64,
}
