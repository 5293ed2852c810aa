//! Canonicalization of raw source records into candidate items.

pub mod html;
pub mod normalizer;
pub mod types;
pub mod util;

pub use normalizer::{normalize_items, NormalizeOutcome};
pub use types::*;

/// Maximum retained summary length after markup stripping.
pub const SUMMARY_MAX_CHARS: usize = 400;
