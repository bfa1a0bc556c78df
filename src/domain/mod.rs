// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust types for the digit-sequence problem:
//   - the codec between digit strings and (L, 10) tensors
//   - the shared sequence configuration and scalar normalization
//   - raw pairs, inversions, errors and the traits other layers
//     implement
//
// Nothing here touches burn, the filesystem or stdin.

pub mod codec;
pub mod error;
pub mod pair;
pub mod sequence;
pub mod traits;
