//! Cluster scoring and the recency/priority gate.
//!
//! Scoring is a ranking concern only: it never influences cluster
//! membership. The formula is a pluggable strategy so deployments can swap
//! weights without touching the clustering logic.

use chrono::{DateTime, Duration, Utc};

use crate::config::{PipelineConfig, ScoreWeights};
use crate::normalize::{CandidateItem, SourceTier};

/// Everything a strategy may consider when scoring one cluster.
#[derive(Debug)]
pub struct ScoreContext<'a> {
    pub primary: &'a CandidateItem,
    pub secondary_count: usize,
    /// Whether the primary's source is in the whitelist.
    pub whitelisted: bool,
    pub now: DateTime<Utc>,
}

/// Pluggable scoring policy.
pub trait ScoringStrategy {
    fn score(&self, context: &ScoreContext<'_>) -> f64;
}

/// The default weighted-sum policy: coverage depth (capped), primary source
/// tier, whitelist membership, and a recency bonus that is a hard gate, not
/// a multiplier.
#[derive(Debug, Clone)]
pub struct WeightedScorer {
    pub weights: ScoreWeights,
    pub depth_cap: usize,
    pub recency_window: Duration,
}

impl WeightedScorer {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            weights: config.weights.clone(),
            depth_cap: config.depth_cap,
            recency_window: Duration::hours(config.recency_window_hours),
        }
    }
}

impl ScoringStrategy for WeightedScorer {
    fn score(&self, context: &ScoreContext<'_>) -> f64 {
        let depth = context.secondary_count.min(self.depth_cap) as f64 * self.weights.depth;
        let tier = context.primary.tier.value() * self.weights.tier;
        let whitelist = if context.whitelisted {
            self.weights.whitelist
        } else {
            0.0
        };
        let recency = recency_bonus(
            context.primary.published_at,
            context.now,
            self.recency_window,
            self.weights.recency,
        );
        depth + tier + whitelist + recency
    }
}

/// Linear decay from `weight` to zero across the window; strictly zero once
/// the window is exceeded.
pub fn recency_bonus(
    published_at: DateTime<Utc>,
    now: DateTime<Utc>,
    window: Duration,
    weight: f64,
) -> f64 {
    let age = now - published_at;
    if age > window {
        return 0.0;
    }
    if age <= Duration::zero() {
        return weight;
    }
    let fraction = age.num_seconds() as f64 / window.num_seconds() as f64;
    weight * (1.0 - fraction)
}

/// The recency/priority gate: fresh coverage from a priority or verified
/// source. Annotation only; it never deletes or re-clusters items.
pub fn is_priority(primary: &CandidateItem, now: DateTime<Utc>, window: Duration) -> bool {
    now - primary.published_at <= window && primary.tier >= SourceTier::Priority
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn item(tier: SourceTier, age: Duration, now: DateTime<Utc>) -> CandidateItem {
        CandidateItem {
            id: "x".to_string(),
            title: "story".to_string(),
            summary: String::new(),
            source_name: "test".to_string(),
            tier,
            published_at: now - age,
            url: "https://example.com/x".to_string(),
            qualifies: true,
            technical_keywords: Vec::new(),
        }
    }

    fn scorer() -> WeightedScorer {
        WeightedScorer {
            weights: ScoreWeights::default(),
            depth_cap: 5,
            recency_window: Duration::hours(48),
        }
    }

    #[test]
    fn depth_term_is_capped() {
        let now = Utc::now();
        let primary = item(SourceTier::Standard, Duration::hours(100), now);
        let shallow = ScoreContext {
            primary: &primary,
            secondary_count: 5,
            whitelisted: false,
            now,
        };
        let deep = ScoreContext {
            primary: &primary,
            secondary_count: 50,
            whitelisted: false,
            now,
        };
        let scorer = scorer();
        assert_eq!(scorer.score(&shallow), scorer.score(&deep));
    }

    #[test]
    fn verified_primary_outranks_standard() {
        let now = Utc::now();
        let verified = item(SourceTier::Verified, Duration::hours(100), now);
        let standard = item(SourceTier::Standard, Duration::hours(100), now);
        let scorer = scorer();
        let verified_score = scorer.score(&ScoreContext {
            primary: &verified,
            secondary_count: 0,
            whitelisted: false,
            now,
        });
        let standard_score = scorer.score(&ScoreContext {
            primary: &standard,
            secondary_count: 0,
            whitelisted: false,
            now,
        });
        assert!(verified_score > standard_score);
    }

    #[test]
    fn recency_bonus_is_zero_beyond_window_not_merely_diminished() {
        let now = Utc::now();
        let window = Duration::hours(48);
        let just_outside = now - (window + Duration::minutes(1));
        assert_eq!(recency_bonus(just_outside, now, window, 2.0), 0.0);

        let far_outside = now - Duration::days(30);
        assert_eq!(recency_bonus(far_outside, now, window, 2.0), 0.0);
    }

    #[test]
    fn recency_bonus_decays_inside_window() {
        let now = Utc::now();
        let window = Duration::hours(48);
        let fresh = recency_bonus(now - Duration::hours(1), now, window, 2.0);
        let stale = recency_bonus(now - Duration::hours(47), now, window, 2.0);
        assert!(fresh > stale);
        assert!(stale > 0.0);
        assert!(fresh <= 2.0);
    }

    #[test]
    fn scores_are_non_negative() {
        let now = Utc::now();
        let primary = item(SourceTier::Standard, Duration::days(90), now);
        let score = scorer().score(&ScoreContext {
            primary: &primary,
            secondary_count: 0,
            whitelisted: false,
            now,
        });
        assert!(score >= 0.0);
    }

    #[test]
    fn priority_gate_boundary() {
        let now = Utc::now();
        let window = Duration::hours(48);

        let inside = item(
            SourceTier::Priority,
            Duration::hours(47) + Duration::minutes(59),
            now,
        );
        assert!(is_priority(&inside, now, window));

        let outside = item(
            SourceTier::Priority,
            Duration::hours(48) + Duration::minutes(1),
            now,
        );
        assert!(!is_priority(&outside, now, window));
    }

    #[test]
    fn standard_tier_never_priority_even_when_fresh() {
        let now = Utc::now();
        let fresh = item(SourceTier::Standard, Duration::hours(1), now);
        assert!(!is_priority(&fresh, now, Duration::hours(48)));
    }

    #[test]
    fn verified_tier_passes_the_gate() {
        let now = Utc::now();
        let fresh = item(SourceTier::Verified, Duration::hours(1), now);
        assert!(is_priority(&fresh, now, Duration::hours(48)));
    }
}
