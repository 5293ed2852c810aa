//! Type definitions for the cluster module.

use serde::{Deserialize, Serialize};

use crate::normalize::CandidateItem;

/// Which existing cluster members a new item is compared against.
///
/// Representative-only is the documented default: each item is compared to
/// the first member of every cluster, O(n*k) with stable results. AllMembers
/// trades cost for recall; the two diverge on borderline items that match a
/// later member but not the cluster's original representative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkagePolicy {
    Representative,
    AllMembers,
}

/// A qualifying item with its embedding attached, ready for clustering.
#[derive(Debug, Clone)]
pub struct EmbeddedItem {
    pub item: CandidateItem,
    pub vector: Vec<f32>,
}

/// A set of items believed to report the same underlying story. Terminal
/// artifact of the run, handed to the caller for persistence.
#[derive(Debug, Clone, Serialize)]
pub struct StoryCluster {
    /// Member item ids, in clustering order (representative first).
    pub members: Vec<String>,
    /// The canonical item chosen to represent the story.
    pub primary_id: String,
    /// Remaining members, most recent coverage first.
    pub secondary_ids: Vec<String>,
    /// Composite ranking score; never negative.
    pub score: f64,
    /// Freshness+tier gate, independent of the score.
    pub is_priority: bool,
    /// Full member records, for callers that render without a second lookup.
    pub items: Vec<CandidateItem>,
}
