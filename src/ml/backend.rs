// ============================================================
// Layer 5 — Backend Selection
// ============================================================
// ndarray (CPU) by default; build with `--features wgpu` to run
// both training and inference on the GPU instead.

use burn::prelude::*;

#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray;

#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;

/// Training needs gradients, so it wraps the inference backend.
pub type TrainBackend = burn::backend::Autodiff<InferBackend>;

pub fn default_device() -> <InferBackend as Backend>::Device {
    Default::default()
}
