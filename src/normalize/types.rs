//! Type definitions for the normalize module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::util::normalize_source_name;

/// One raw piece of coverage as supplied by the caller, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawItem {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub source_name: Option<String>,
    pub published_at: Option<String>,
    pub url: Option<String>,
}

/// Source trust tier. Ordering matters: later variants outrank earlier ones
/// during primary selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTier {
    Standard,
    Priority,
    Verified,
}

impl Default for SourceTier {
    fn default() -> Self {
        SourceTier::Standard
    }
}

impl SourceTier {
    /// Numeric value used by the scorer: standard=1, priority=2, verified=3.
    pub fn value(&self) -> f64 {
        match self {
            SourceTier::Standard => 1.0,
            SourceTier::Priority => 2.0,
            SourceTier::Verified => 3.0,
        }
    }
}

/// A normalized candidate item. Immutable once constructed; discarded at the
/// end of the run except through the persisted output.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateItem {
    /// Stable hash of the canonical URL.
    pub id: String,
    pub title: String,
    pub summary: String,
    pub source_name: String,
    pub tier: SourceTier,
    pub published_at: DateTime<Utc>,
    pub url: String,
    /// Keyword-density pass/fail; non-qualifying items never enter clustering.
    pub qualifies: bool,
    /// Technical lexicon matches, used only as a clustering tie-break signal.
    pub technical_keywords: Vec<String>,
}

/// Per-source whitelist entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WhitelistEntry {
    #[serde(default)]
    pub tier: SourceTier,
    /// Marks an outlet whose coverage should win primary selection over
    /// same-tier competitors.
    #[serde(default)]
    pub primary_outlet: bool,
}

/// Read-only source metadata supplied by the caller: tier mapping plus the
/// domain-level priority/delist lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Whitelist {
    pub sources: HashMap<String, WhitelistEntry>,
    /// URL hosts whose coverage is lifted to the priority tier.
    pub priority_domains: Vec<String>,
    /// URL hosts excluded from the run entirely (press-release wires etc).
    pub delist_domains: Vec<String>,
    /// Source names excluded from the run entirely.
    pub banned_sources: Vec<String>,
}

impl Whitelist {
    /// Looks up a source by its normalized name.
    pub fn entry(&self, source_name: &str) -> Option<&WhitelistEntry> {
        let wanted = normalize_source_name(source_name);
        self.sources
            .iter()
            .find(|(name, _)| normalize_source_name(name) == wanted)
            .map(|(_, entry)| entry)
    }

    pub fn contains(&self, source_name: &str) -> bool {
        self.entry(source_name).is_some()
    }
}

/// A record rejected during normalization. The run continues without it.
#[derive(Debug, Clone, Serialize)]
pub struct MalformedItem {
    pub id: String,
    pub reason: String,
}
