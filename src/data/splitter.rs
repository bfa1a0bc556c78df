// ============================================================
// Layer 4 — Sampling and Partitioning
// ============================================================
// Seeded, reproducible data selection:
//
//   subsample   — uniform draw of N rows without replacement
//   split       — shuffle, then hold out ceil(n · fraction) items
//   partition   — 70% train / 15% validation / 15% test,
//                 done as a 70/30 split followed by a 50/50
//                 split of the held-out 30%
//
// The held-out side is always rounded up:
//   n = 10 → 7 / 1 / 2
//   n = 7  → 4 / 1 / 2
//
// Every function takes an explicit seed and uses StdRng, so the
// same seed and input order always give the same partitions.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::domain::error::DatasetError;

pub const HOLDOUT_FRACTION: f64 = 0.3;
pub const TEST_SHARE_OF_HOLDOUT: f64 = 0.5;

/// Draw `sample_size` items uniformly without replacement.
/// Nothing is returned on failure, so no partial dataset escapes.
pub fn subsample<T>(
    mut samples: Vec<T>,
    sample_size: usize,
    seed:        u64,
) -> Result<Vec<T>, DatasetError> {
    if sample_size > samples.len() {
        return Err(DatasetError::SampleSizeExceedsPopulation {
            requested: sample_size,
            available: samples.len(),
        });
    }
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);
    samples.truncate(sample_size);
    Ok(samples)
}

/// Shuffle `samples` with `seed` and split into (kept, held_out) where
/// `held_out` holds `ceil(len * holdout_fraction)` items.
pub fn split_holdout<T>(mut samples: Vec<T>, holdout_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let held_out = (((total as f64) * holdout_fraction).ceil() as usize).min(total);
    let split_at = total - held_out;

    // split_off(n) leaves [0..n) in `samples`
    let rest = samples.split_off(split_at);
    (samples, rest)
}

/// The three disjoint partitions of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct Partitions<T> {
    pub train:      Vec<T>,
    pub validation: Vec<T>,
    pub test:       Vec<T>,
}

impl<T> Partitions<T> {
    pub fn total(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }
}

pub fn partition<T>(samples: Vec<T>, seed: u64) -> Partitions<T> {
    let (train, holdout)   = split_holdout(samples, HOLDOUT_FRACTION, seed);
    let (validation, test) = split_holdout(holdout, TEST_SHARE_OF_HOLDOUT, seed);

    tracing::debug!(
        "Partitioned: {} train, {} validation, {} test",
        train.len(),
        validation.len(),
        test.len(),
    );

    Partitions { train, validation, test }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, val)      = split_holdout(items, 0.2, 42);
        assert_eq!(train.len(), 80);
        assert_eq!(val.len(),   20);
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, val)      = split_holdout(items, 0.2, 42);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }

    #[test]
    fn test_partition_sizes_sum_and_are_disjoint() {
        for n in [0usize, 1, 2, 7, 100, 1001] {
            let parts = partition((0..n).collect::<Vec<_>>(), 42);
            assert_eq!(parts.total(), n);

            let mut seen = HashSet::new();
            for x in parts.train.iter().chain(&parts.validation).chain(&parts.test) {
                assert!(seen.insert(*x), "{x} assigned twice");
            }
        }

        let parts = partition((0..100).collect::<Vec<_>>(), 42);
        assert_eq!(parts.train.len(), 70);
        assert_eq!(parts.validation.len(), 15);
        assert_eq!(parts.test.len(), 15);
    }

    #[test]
    fn test_partition_rounds_held_out_side_up() {
        let sizes = |n: usize| {
            let p = partition((0..n).collect::<Vec<_>>(), 42);
            (p.train.len(), p.validation.len(), p.test.len())
        };
        assert_eq!(sizes(7), (4, 1, 2));
        assert_eq!(sizes(10), (7, 1, 2));
        assert_eq!(sizes(20), (14, 3, 3));
        assert_eq!(sizes(1001), (700, 150, 151));
    }

    #[test]
    fn test_partition_is_reproducible() {
        let a = partition((0..500).collect::<Vec<_>>(), 7);
        let b = partition((0..500).collect::<Vec<_>>(), 7);
        assert_eq!(a, b);

        let c = partition((0..500).collect::<Vec<_>>(), 8);
        assert_ne!(a.train, c.train);
    }

    #[test]
    fn test_subsample_draws_without_replacement() {
        let picked = subsample((0..50).collect::<Vec<_>>(), 20, 42).unwrap();
        assert_eq!(picked.len(), 20);
        let unique: HashSet<_> = picked.iter().collect();
        assert_eq!(unique.len(), 20);
        assert_eq!(picked, subsample((0..50).collect::<Vec<_>>(), 20, 42).unwrap());
    }

    #[test]
    fn test_subsample_whole_population_is_allowed() {
        assert_eq!(subsample(vec![1, 2, 3], 3, 1).unwrap().len(), 3);
    }

    #[test]
    fn test_subsample_too_large_fails() {
        assert_eq!(
            subsample(vec![1, 2, 3], 4, 42),
            Err(DatasetError::SampleSizeExceedsPopulation { requested: 4, available: 3 })
        );
    }
}
