// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the CSV file and tensor batches:
//
//   data.csv
//       │
//       ▼
//   CsvPairLoader     → (input, output) rows as literal text
//       │
//       ▼
//   DatasetBuilder    → subsample, encode, normalize
//       │
//       ▼
//   splitter          → 70 / 15 / 15 seeded partitions
//       │
//       ▼
//   DigitDataset      → burn Dataset over one partition
//       │
//       ▼
//   DigitBatcher      → [batch, 1] inputs, [batch, L] targets

/// Reads the CSV dataset with the csv crate
pub mod loader;

/// Seeded subsampling and train/validation/test partitioning
pub mod splitter;

/// DatasetBuilder plus burn's Dataset trait for digit samples
pub mod dataset;

/// burn Batcher producing tensor batches
pub mod batcher;
