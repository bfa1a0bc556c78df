// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence:
//
//   checkpoint.rs — model weights (burn recorder) plus the
//                   TrainConfig / SequenceConfig JSON shared by
//                   training and inference
//
//   metrics.rs    — per-epoch loss and accuracy as CSV

/// Model checkpoint and config saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
