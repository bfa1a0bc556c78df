// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer depends on these, not on CSV files or
// burn models, so the predictor loop and dataset builder can be
// tested with in-memory stand-ins.

use anyhow::Result;

use crate::domain::pair::{Inversion, RawPair};

// ─── PairSource ───────────────────────────────────────────────────────────────
/// Anything that can yield (input, output) text pairs.
///
/// Implementations:
///   - CsvPairLoader → reads a CSV with `input` and `output` columns
pub trait PairSource {
    fn load_pairs(&self) -> Result<Vec<RawPair>>;
}

impl PairSource for Vec<RawPair> {
    fn load_pairs(&self) -> Result<Vec<RawPair>> {
        Ok(self.clone())
    }
}

// ─── SequenceInverter ─────────────────────────────────────────────────────────
/// Maps a digit sequence back to a predicted scalar input.
///
/// Implementations:
///   - Inferencer → searches the trained model's scalar domain
pub trait SequenceInverter {
    /// Capacity L the inverter was trained against.
    fn capacity(&self) -> usize;

    /// `digits` is already validated and at most `capacity` long.
    fn invert(&self, digits: &str) -> Result<Inversion>;
}
