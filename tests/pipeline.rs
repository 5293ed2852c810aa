//! End-to-end pipeline runs against a deterministic stub embedding provider.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;

use newsforge::config::PipelineConfig;
use newsforge::embedding::Embedder;
use newsforge::normalize::{RawItem, SourceTier, Whitelist, WhitelistEntry};
use newsforge::pipeline::{run, RunFailure};

/// Unit vector whose cosine similarity to `[1, 0]` is exactly `c`.
fn vec_at(c: f32) -> Vec<f32> {
    vec![c, (1.0 - c * c).sqrt()]
}

/// Unit vector at an angle, for spacing unrelated stories far apart.
fn vec_deg(degrees: f32) -> Vec<f32> {
    let radians = degrees.to_radians();
    vec![radians.cos(), radians.sin()]
}

/// Maps any text containing a known marker to a fixed vector; texts
/// containing "FLAKY" simulate a provider failure.
struct StubEmbedder {
    vectors: HashMap<String, Vec<f32>>,
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.contains("FLAKY") {
            return Err(anyhow!("rate limited"));
        }
        self.vectors
            .iter()
            .find(|(marker, _)| text.contains(marker.as_str()))
            .map(|(_, vector)| vector.clone())
            .ok_or_else(|| anyhow!("no vector configured"))
    }
}

fn stub() -> StubEmbedder {
    // Angles chosen so only the two intended pairs clear the thresholds;
    // every other pairing stays well below the low bound.
    let vectors: HashMap<String, Vec<f32>> = [
        ("launch-story", vec_deg(0.0)),
        ("launch-echo", vec_at(0.83)),
        ("funding-story", vec_deg(90.0)),
        ("research-story", vec_deg(140.0)),
        ("outage-story", vec_deg(190.0)),
        ("outage-echo", vec_deg(195.0)),
        ("hiring-story", vec_deg(250.0)),
        ("security-story", vec_deg(305.0)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    StubEmbedder { vectors }
}

fn config() -> PipelineConfig {
    PipelineConfig {
        strong_keywords: vec!["openclaw".to_string()],
        weak_keywords: vec!["agent".to_string()],
        technical_keywords: vec!["sandbox".to_string()],
        ..PipelineConfig::default()
    }
}

fn whitelist() -> Whitelist {
    let mut sources = HashMap::new();
    sources.insert(
        "The Verge".to_string(),
        WhitelistEntry {
            tier: SourceTier::Verified,
            primary_outlet: false,
        },
    );
    Whitelist {
        sources,
        ..Whitelist::default()
    }
}

fn raw(title: &str, source: &str, url: &str, hours_ago: i64) -> RawItem {
    RawItem {
        title: Some(format!("OpenClaw {}", title)),
        summary: Some("OpenClaw ecosystem coverage".to_string()),
        source_name: Some(source.to_string()),
        published_at: Some((Utc::now() - Duration::hours(hours_ago)).to_rfc3339()),
        url: Some(url.to_string()),
    }
}

fn batch() -> Vec<RawItem> {
    vec![
        raw("launch-story", "Example Blog", "https://a.example.com/1", 30),
        raw("launch-echo", "The Verge", "https://b.example.com/2", 2),
        raw("funding-story", "Example Blog", "https://a.example.com/3", 3),
        raw("research-story", "Example Blog", "https://a.example.com/4", 4),
        raw("outage-story", "Example Blog", "https://a.example.com/5", 5),
        raw("outage-echo", "Example Blog", "https://a.example.com/6", 6),
        raw("hiring-story", "Example Blog", "https://a.example.com/7", 7),
        raw("security-story", "Example Blog", "https://a.example.com/8", 8),
        raw("FLAKY-one", "Example Blog", "https://a.example.com/9", 9),
        raw("FLAKY-two", "Example Blog", "https://a.example.com/10", 10),
    ]
}

#[tokio::test]
async fn partial_embedding_failure_still_partitions_the_rest() {
    let output = run(&config(), &whitelist(), batch(), &stub(), Utc::now())
        .await
        .unwrap();

    let embed_failures: Vec<&RunFailure> = output
        .failures
        .iter()
        .filter(|f| matches!(f, RunFailure::EmbedFailed { .. }))
        .collect();
    assert_eq!(embed_failures.len(), 2);

    // The 8 embedded items form a valid partition.
    let mut clustered: Vec<String> = output
        .clusters
        .iter()
        .flat_map(|c| c.members.iter().cloned())
        .collect();
    let total: usize = clustered.len();
    clustered.sort();
    clustered.dedup();
    assert_eq!(total, 8);
    assert_eq!(clustered.len(), 8);
}

#[tokio::test]
async fn near_duplicates_collapse_with_verified_primary() {
    let output = run(&config(), &whitelist(), batch(), &stub(), Utc::now())
        .await
        .unwrap();

    let launch_cluster = output
        .clusters
        .iter()
        .find(|c| c.members.len() == 2 && c.items.iter().any(|i| i.title.contains("launch")))
        .expect("launch coverage should form one cluster");

    // The Verge is verified, so its later echo still wins primary selection.
    let primary = launch_cluster
        .items
        .iter()
        .find(|i| i.id == launch_cluster.primary_id)
        .unwrap();
    assert_eq!(primary.source_name, "The Verge");
    assert_eq!(launch_cluster.secondary_ids.len(), 1);
    assert!(launch_cluster.is_priority);
}

#[tokio::test]
async fn singleton_cluster_has_itself_as_primary() {
    let output = run(&config(), &whitelist(), batch(), &stub(), Utc::now())
        .await
        .unwrap();

    let singleton = output
        .clusters
        .iter()
        .find(|c| c.items.iter().any(|i| i.title.contains("hiring")))
        .unwrap();
    assert_eq!(singleton.members.len(), 1);
    assert_eq!(singleton.primary_id, singleton.members[0]);
    assert!(singleton.secondary_ids.is_empty());
}

#[tokio::test]
async fn non_qualifying_items_never_reach_clusters() {
    let mut items = batch();
    items.push(RawItem {
        title: Some("Grain futures drift sideways".to_string()),
        summary: Some("No relevant mentions at all".to_string()),
        source_name: Some("Example Blog".to_string()),
        published_at: Some(Utc::now().to_rfc3339()),
        url: Some("https://a.example.com/offtopic".to_string()),
    });

    let output = run(&config(), &whitelist(), items, &stub(), Utc::now())
        .await
        .unwrap();

    assert_eq!(output.non_qualifying.len(), 1);
    let off_topic_id = &output.non_qualifying[0].id;
    assert!(output
        .clusters
        .iter()
        .all(|c| !c.members.contains(off_topic_id)));
}

#[tokio::test]
async fn duplicate_urls_produce_one_member() {
    let mut items = batch();
    items.push(raw(
        "launch-story repeated",
        "Copycat",
        "https://a.example.com/1",
        1,
    ));

    let output = run(&config(), &whitelist(), items, &stub(), Utc::now())
        .await
        .unwrap();

    let clustered: usize = output.clusters.iter().map(|c| c.members.len()).sum();
    assert_eq!(clustered, 8);
}

#[tokio::test]
async fn runs_are_deterministic() {
    let now = Utc::now();
    let first = run(&config(), &whitelist(), batch(), &stub(), now)
        .await
        .unwrap();
    let second = run(&config(), &whitelist(), batch(), &stub(), now)
        .await
        .unwrap();

    let summarize = |output: &newsforge::pipeline::RunOutput| {
        output
            .clusters
            .iter()
            .map(|c| (c.members.clone(), c.primary_id.clone(), c.score))
            .collect::<Vec<_>>()
    };
    assert_eq!(summarize(&first), summarize(&second));
}

#[tokio::test]
async fn ranked_output_and_spotlight_are_consistent() {
    let output = run(&config(), &whitelist(), batch(), &stub(), Utc::now())
        .await
        .unwrap();

    for pair in output.clusters.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert_eq!(output.spotlight().len(), 4);
    assert_eq!(output.spotlight()[0].score, output.clusters[0].score);
}

#[tokio::test]
async fn invalid_configuration_aborts_before_processing() {
    let bad = PipelineConfig {
        similarity_low_threshold: 0.9,
        ..config()
    };
    let result = run(&bad, &whitelist(), batch(), &stub(), Utc::now()).await;
    assert!(result.is_err());
}
