//! Pipeline configuration: similarity thresholds, scoring weights, keyword
//! sets, and run limits. Configuration is passed explicitly into each run so
//! repeated runs and tests can vary it without cross-run interference.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::cluster::LinkagePolicy;

/// Weights for the composite cluster score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Applied to the capped secondary-coverage count.
    pub depth: f64,
    /// Applied to the primary's source tier value (standard=1, priority=2, verified=3).
    pub tier: f64,
    /// Flat bonus when the primary's source is whitelisted.
    pub whitelist: f64,
    /// Maximum recency bonus, decaying linearly to zero across the recency window.
    pub recency: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            depth: 1.0,
            tier: 1.5,
            whitelist: 1.0,
            recency: 2.0,
        }
    }
}

/// All recognized pipeline options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Unconditional merge bound for cosine similarity.
    pub similarity_high_threshold: f32,
    /// Merge bound when the pair also shares a technical keyword.
    pub similarity_low_threshold: f32,
    /// Priority gate and score decay horizon, in hours.
    pub recency_window_hours: i64,
    /// Cap on the coverage-depth term of the score.
    pub depth_cap: usize,
    /// Advisory spotlight size; the full ranked list is always emitted.
    pub spotlight_slots: usize,
    /// Maximum concurrent embedding calls.
    pub embed_concurrency: usize,
    /// Cluster comparison policy (representative-only by default).
    pub linkage: LinkagePolicy,
    /// Strong brand keywords; one whole-word hit qualifies an item.
    pub strong_keywords: Vec<String>,
    /// Weak brand keywords; `min_weak_hits` whole-word hits qualify an item.
    pub weak_keywords: Vec<String>,
    /// Technical lexicon used only as the moderate-similarity tie-break signal.
    pub technical_keywords: Vec<String>,
    /// Minimum strong-keyword occurrences for qualification.
    pub min_strong_hits: usize,
    /// Minimum weak-keyword occurrences for qualification.
    pub min_weak_hits: usize,
    pub weights: ScoreWeights,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            similarity_high_threshold: 0.82,
            similarity_low_threshold: 0.75,
            recency_window_hours: 48,
            depth_cap: 5,
            spotlight_slots: 4,
            embed_concurrency: 4,
            linkage: LinkagePolicy::Representative,
            strong_keywords: Vec::new(),
            weak_keywords: Vec::new(),
            technical_keywords: Vec::new(),
            min_strong_hits: 1,
            min_weak_hits: 2,
            weights: ScoreWeights::default(),
        }
    }
}

impl PipelineConfig {
    /// Loads and validates a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Structural validation. Invalid thresholds or weights abort the run
    /// before any processing, since silently proceeding would produce an
    /// unreproducible clustering.
    pub fn validate(&self) -> Result<()> {
        if self.similarity_low_threshold >= self.similarity_high_threshold {
            bail!(
                "similarity_low_threshold ({}) must be below similarity_high_threshold ({})",
                self.similarity_low_threshold,
                self.similarity_high_threshold
            );
        }
        if self.similarity_low_threshold <= 0.0 || self.similarity_high_threshold > 1.0 {
            bail!(
                "similarity thresholds must fall in (0.0, 1.0]: low={}, high={}",
                self.similarity_low_threshold,
                self.similarity_high_threshold
            );
        }
        if self.recency_window_hours <= 0 {
            bail!(
                "recency_window_hours must be positive, got {}",
                self.recency_window_hours
            );
        }
        if self.embed_concurrency == 0 {
            bail!("embed_concurrency must be at least 1");
        }
        let w = &self.weights;
        if w.depth < 0.0 || w.tier < 0.0 || w.whitelist < 0.0 || w.recency < 0.0 {
            bail!(
                "score weights must be non-negative: depth={}, tier={}, whitelist={}, recency={}",
                w.depth,
                w.tier,
                w.whitelist,
                w.recency
            );
        }
        if self.strong_keywords.is_empty() && self.weak_keywords.is_empty() {
            bail!("at least one strong or weak keyword is required for qualification");
        }
        Ok(())
    }
}
