//! Run orchestration: normalize, embed, cluster, select, score, rank.
//!
//! One invocation processes one batch. Per-item failures accumulate in the
//! output instead of aborting; only configuration errors are fatal, raised
//! before any processing starts.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use crate::cluster::{cluster_items, select_primary, EmbeddedItem, StoryCluster};
use crate::config::PipelineConfig;
use crate::embedding::{embed_items, Embedder};
use crate::keywords::KeywordMatcher;
use crate::normalize::{normalize_items, CandidateItem, RawItem, Whitelist};
use crate::scoring::{is_priority, ScoreContext, ScoringStrategy, WeightedScorer};
use crate::TARGET_PIPELINE;

/// A per-item failure recorded for observability. Per-item errors never
/// abort the batch.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunFailure {
    MalformedItem { id: String, reason: String },
    EmbedFailed { id: String, reason: String },
}

/// Terminal artifact of one run, handed to the caller for persistence.
#[derive(Debug, Serialize)]
pub struct RunOutput {
    /// Calendar-day key for the caller's dispatch grouping.
    pub dispatch_date: NaiveDate,
    /// Story clusters ranked by score, descending.
    pub clusters: Vec<StoryCluster>,
    /// Items that failed keyword qualification; retained for the caller,
    /// never clustered.
    pub non_qualifying: Vec<CandidateItem>,
    /// URLs excluded by the delist/ban lists.
    pub delisted: Vec<String>,
    pub failures: Vec<RunFailure>,
    /// Advisory spotlight size; not enforced here.
    pub spotlight_slots: usize,
}

impl RunOutput {
    /// The top-ranked clusters, at most `spotlight_slots` of them.
    pub fn spotlight(&self) -> &[StoryCluster] {
        let end = self.spotlight_slots.min(self.clusters.len());
        &self.clusters[..end]
    }
}

/// Runs the pipeline with the default weighted scorer.
pub async fn run(
    config: &PipelineConfig,
    whitelist: &Whitelist,
    raw_items: Vec<RawItem>,
    embedder: &dyn Embedder,
    now: DateTime<Utc>,
) -> Result<RunOutput> {
    let scorer = WeightedScorer::from_config(config);
    run_with_scorer(config, whitelist, raw_items, embedder, now, &scorer).await
}

/// Runs the pipeline with a caller-supplied scoring strategy.
pub async fn run_with_scorer(
    config: &PipelineConfig,
    whitelist: &Whitelist,
    raw_items: Vec<RawItem>,
    embedder: &dyn Embedder,
    now: DateTime<Utc>,
    scorer: &dyn ScoringStrategy,
) -> Result<RunOutput> {
    config.validate().context("Invalid pipeline configuration")?;
    let matcher = KeywordMatcher::new(config)?;

    let total = raw_items.len();
    let normalized = normalize_items(raw_items, whitelist, &matcher, now);
    info!(
        target: TARGET_PIPELINE,
        "Normalized {} records: {} qualifying, {} non-qualifying, {} delisted, {} malformed",
        total,
        normalized.qualifying.len(),
        normalized.non_qualifying.len(),
        normalized.delisted.len(),
        normalized.failures.len()
    );

    let mut failures: Vec<RunFailure> = normalized
        .failures
        .into_iter()
        .map(|f| RunFailure::MalformedItem {
            id: f.id,
            reason: f.reason,
        })
        .collect();

    // Full materialization barrier: clustering needs every vector resolved
    // before any comparison is meaningful.
    let embed_outcome = embed_items(embedder, normalized.qualifying, config.embed_concurrency).await;
    failures.extend(embed_outcome.failures.into_iter().map(|f| {
        RunFailure::EmbedFailed {
            id: f.id,
            reason: f.reason,
        }
    }));

    let embedded: Vec<EmbeddedItem> = embed_outcome
        .embedded
        .into_iter()
        .map(|(item, vector)| EmbeddedItem { item, vector })
        .collect();

    let groups = cluster_items(&embedded, config);
    let recency_window = Duration::hours(config.recency_window_hours);

    let mut clusters: Vec<StoryCluster> = groups
        .into_iter()
        .map(|group| {
            let members: Vec<&CandidateItem> =
                group.iter().map(|&index| &embedded[index].item).collect();
            build_cluster(&members, whitelist, scorer, now, recency_window)
        })
        .collect();

    // Rank descending by score; ties resolved by primary id for determinism.
    clusters.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.primary_id.cmp(&b.primary_id))
    });

    let singletons = clusters.iter().filter(|c| c.members.len() == 1).count();
    info!(
        target: TARGET_PIPELINE,
        "Run complete: {} clusters ({} singletons), {} failures",
        clusters.len(),
        singletons,
        failures.len()
    );

    Ok(RunOutput {
        dispatch_date: now.date_naive(),
        clusters,
        non_qualifying: normalized.non_qualifying,
        delisted: normalized.delisted,
        failures,
        spotlight_slots: config.spotlight_slots,
    })
}

fn build_cluster(
    members: &[&CandidateItem],
    whitelist: &Whitelist,
    scorer: &dyn ScoringStrategy,
    now: DateTime<Utc>,
    recency_window: Duration,
) -> StoryCluster {
    let primary_index = select_primary(members, whitelist);
    let primary = members[primary_index];

    let mut secondary: Vec<&CandidateItem> = members
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != primary_index)
        .map(|(_, item)| *item)
        .collect();
    // Most recent derivative coverage first.
    secondary.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    let score = scorer.score(&ScoreContext {
        primary,
        secondary_count: secondary.len(),
        whitelisted: whitelist.contains(&primary.source_name),
        now,
    });

    StoryCluster {
        members: members.iter().map(|item| item.id.clone()).collect(),
        primary_id: primary.id.clone(),
        secondary_ids: secondary.iter().map(|item| item.id.clone()).collect(),
        score,
        is_priority: is_priority(primary, now, recency_window),
        items: members.iter().map(|&item| item.clone()).collect(),
    }
}
