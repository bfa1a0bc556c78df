// ============================================================
// Layer 4 — Digit Batcher
// ============================================================
// Implements burn's Batcher trait: Vec<DigitSample> → DigitBatch.
//
//   inputs:  [batch, 1]        normalized scalars as f32
//   targets: [batch, L]  Int   class index per position
//
// Targets are carried as class indices rather than one-hot rows;
// cross-entropy against an index is the same objective as against
// the one-hot tensor and avoids shipping 10x the data.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::DigitSample;

#[derive(Debug, Clone)]
pub struct DigitBatch<B: Backend> {
    /// Normalized scalar inputs — shape: [batch_size, 1]
    pub inputs: Tensor<B, 2>,

    /// Ground-truth digit per position — shape: [batch_size, L]
    pub targets: Tensor<B, 2, Int>,
}

#[derive(Clone, Debug)]
pub struct DigitBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> DigitBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<DigitSample, DigitBatch<B>> for DigitBatcher<B> {
    fn batch(&self, items: Vec<DigitSample>) -> DigitBatch<B> {
        let batch_size = items.len();
        // Every target has exactly L rows (Codec invariant)
        let seq_len = items.first().map(|s| s.target.len()).unwrap_or(0);

        let scalars: Vec<f32> = items
            .iter()
            .map(|s| s.input.value() as f32)
            .collect();

        let classes: Vec<i32> = items
            .iter()
            .flat_map(|s| s.target.argmax().into_iter().map(i32::from))
            .collect();

        let inputs = Tensor::<B, 1>::from_floats(scalars.as_slice(), &self.device)
            .reshape([batch_size, 1]);

        let targets = Tensor::<B, 1, Int>::from_ints(classes.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);

        DigitBatch { inputs, targets }
    }
}
