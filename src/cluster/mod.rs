//! Story clustering: grouping candidate items that cover the same event.

pub mod engine;
pub mod primary;
pub mod similarity;
pub mod types;

pub use engine::cluster_items;
pub use primary::select_primary;
pub use similarity::cosine_similarity;
pub use types::*;
