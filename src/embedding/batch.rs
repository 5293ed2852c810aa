//! Concurrency-limited batch embedding with index-stable reassembly.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use super::{embedding_text, Embedder};
use crate::normalize::CandidateItem;
use crate::TARGET_EMBEDDING;

/// An item excluded from clustering because its embedding failed. The run
/// continues degraded rather than aborting.
#[derive(Debug, Clone, Serialize)]
pub struct EmbedFailed {
    pub id: String,
    pub reason: String,
}

/// Result of embedding one batch: the 1:1 item-to-vector pairs that
/// succeeded, in input order, plus per-item failures.
#[derive(Debug, Default)]
pub struct EmbedOutcome {
    pub embedded: Vec<(CandidateItem, Vec<f32>)>,
    pub failures: Vec<EmbedFailed>,
}

/// Embeds all items with at most `concurrency` in-flight provider calls.
///
/// Completion order on the wire is unconstrained; results are slotted back by
/// input index so the returned pairs preserve input order. Clustering must
/// not start until this returns (full materialization barrier).
pub async fn embed_items(
    embedder: &dyn Embedder,
    items: Vec<CandidateItem>,
    concurrency: usize,
) -> EmbedOutcome {
    let texts: Vec<String> = items.iter().map(embedding_text).collect();

    let results: Vec<(usize, anyhow::Result<Vec<f32>>)> = stream::iter(texts.into_iter().enumerate())
        .map(|(index, text)| async move { (index, embedder.embed(&text).await) })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut slots: Vec<Option<anyhow::Result<Vec<f32>>>> =
        items.iter().map(|_| None).collect();
    for (index, result) in results {
        slots[index] = Some(result);
    }

    let mut outcome = EmbedOutcome::default();
    let mut dimensions: Option<usize> = None;

    for (item, slot) in items.into_iter().zip(slots.into_iter()) {
        match slot {
            Some(Ok(vector)) => {
                if vector.is_empty() {
                    warn!(target: TARGET_EMBEDDING, "Empty embedding for item {}", item.id);
                    outcome.failures.push(EmbedFailed {
                        id: item.id,
                        reason: "empty embedding".to_string(),
                    });
                    continue;
                }
                // Dimensionality is fixed per run by the first successful
                // embedding; mismatched vectors cannot be compared.
                match dimensions {
                    None => dimensions = Some(vector.len()),
                    Some(expected) if expected != vector.len() => {
                        warn!(
                            target: TARGET_EMBEDDING,
                            "Dimension mismatch for item {}: expected {}, got {}",
                            item.id,
                            expected,
                            vector.len()
                        );
                        outcome.failures.push(EmbedFailed {
                            id: item.id,
                            reason: format!(
                                "dimension mismatch: expected {}, got {}",
                                expected,
                                vector.len()
                            ),
                        });
                        continue;
                    }
                    Some(_) => {}
                }
                outcome.embedded.push((item, vector));
            }
            Some(Err(err)) => {
                warn!(target: TARGET_EMBEDDING, "Embedding failed for item {}: {}", item.id, err);
                outcome.failures.push(EmbedFailed {
                    id: item.id,
                    reason: err.to_string(),
                });
            }
            None => unreachable!("every input index receives a result"),
        }
    }

    info!(
        target: TARGET_EMBEDDING,
        "Embedded {} items, {} failures",
        outcome.embedded.len(),
        outcome.failures.len()
    );

    outcome
}
