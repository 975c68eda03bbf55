//! Block-level DSP math shared by the built-in nodes.
//!
//! Every helper works on the valid-sample slice of a block, never on the
//! backing array, so partially filled blocks are handled uniformly.

pub mod helpers;

pub use helpers::{accumulate_scaled, multiply, peak_abs, scale, sum_squares};
