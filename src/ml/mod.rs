// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Everything that touches burn tensors lives here; the domain
// and application layers only see CategoricalTensor, Inversion
// and the reports defined below.
//
//   backend.rs        — ndarray or wgpu, plus the autodiff wrapper
//   model.rs          — dense expansion → LSTM → per-position classifier
//   early_stopping.rs — patience counter and best-weights snapshot
//   trainer.rs        — Adam loop, validation, checkpointing, test eval
//   inferencer.rs     — loads the artifact and inverts digit sequences
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Hochreiter & Schmidhuber (1997) LSTM

/// Compile-time backend choice
pub mod backend;

/// Scalar → (L, 10) sequence model
pub mod model;

/// Best-snapshot early stopping
pub mod early_stopping;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Inference engine — loads checkpoint and inverts sequences
pub mod inferencer;
