//! Key result progress normalization and value formatting.
//!
//! Both halves are pure: they never error and degrade to fixed fallbacks
//! (`0` progress, the placeholder string) for unusable input.

mod format;
mod normalize;

pub use format::{format_value, FormatConfig};
pub use normalize::{mean_progress, progress};
