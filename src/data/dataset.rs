// ============================================================
// Layer 4 — Dataset Builder
// ============================================================
// Raw text pairs → encoded, normalized, partitioned samples.
//
//   load pairs       (PairSource)
//   subsample        (optional, seeded)
//   encode outputs   (Codec → one-hot (L, 10))
//   normalize inputs (value / normalization_max)
//   partition        (70 / 15 / 15, seeded)
//
// Samples are immutable once built; each partition is wrapped
// in a DigitDataset so burn's DataLoader can index into it.

use anyhow::{Context, Result};
use burn::data::dataset::Dataset;

use crate::data::splitter::{partition, subsample, Partitions};
use crate::domain::codec::CategoricalTensor;
use crate::domain::sequence::{ScalarInput, SequenceConfig};
use crate::domain::traits::PairSource;

/// One training example: a normalized scalar and its one-hot target.
#[derive(Debug, Clone)]
pub struct DigitSample {
    pub input:  ScalarInput,
    pub target: CategoricalTensor,
}

pub struct DigitDataset {
    samples: Vec<DigitSample>,
}

impl DigitDataset {
    pub fn new(samples: Vec<DigitSample>) -> Self { Self { samples } }
}

impl Dataset<DigitSample> for DigitDataset {
    fn get(&self, index: usize) -> Option<DigitSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

pub struct DatasetBuilder {
    sequence:    SequenceConfig,
    sample_size: Option<usize>,
    seed:        u64,
}

impl DatasetBuilder {
    pub fn new(sequence: SequenceConfig, seed: u64) -> Self {
        Self { sequence, sample_size: None, seed }
    }

    pub fn with_sample_size(mut self, sample_size: Option<usize>) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn build(&self, source: &impl PairSource) -> Result<Partitions<DigitSample>> {
        let mut pairs = source.load_pairs()?;

        if let Some(n) = self.sample_size {
            pairs = subsample(pairs, n, self.seed)?;
            tracing::info!("Sampled {} rows from the dataset", n);
        }

        let codec = self.sequence.codec();
        let samples = pairs
            .iter()
            .enumerate()
            .map(|(row, pair)| -> Result<DigitSample> {
                let input = self
                    .sequence
                    .parse_scalar(&pair.input)
                    .with_context(|| format!("Bad input column in row {row}"))?;
                let target = codec
                    .encode(&pair.output)
                    .with_context(|| format!("Bad output column in row {row}"))?;
                Ok(DigitSample { input, target })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            "Encoded {} samples: input shape ({},), output shape ({}, {}, {})",
            samples.len(),
            samples.len(),
            samples.len(),
            self.sequence.capacity,
            self.sequence.num_classes,
        );

        Ok(partition(samples, self.seed))
    }
}
