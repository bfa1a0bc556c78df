// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// goal: train a model offline, or invert sequences online.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No clap types here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow
pub mod train_use_case;

// The interactive inversion workflow
pub mod predict_use_case;
