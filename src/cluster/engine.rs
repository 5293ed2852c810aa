//! Greedy single-pass clustering over pairwise cosine similarity.
//!
//! Items are processed in input order and compared against existing clusters
//! under the configured linkage policy. The merge rule is a dual threshold:
//! similarity above the high bound joins unconditionally; similarity above
//! the low bound joins only when the pair shares a technical keyword, since
//! raw similarity between two short headlines is noisy at moderate scores.

use tracing::debug;

use super::similarity::cosine_similarity;
use super::types::{EmbeddedItem, LinkagePolicy};
use crate::config::PipelineConfig;
use crate::TARGET_CLUSTER;

fn shares_technical_keyword(a: &EmbeddedItem, b: &EmbeddedItem) -> bool {
    a.item
        .technical_keywords
        .iter()
        .any(|keyword| b.item.technical_keywords.contains(keyword))
}

/// Whether a single pair of items belongs to the same story.
fn pair_merges(a: &EmbeddedItem, b: &EmbeddedItem, config: &PipelineConfig) -> bool {
    let similarity = match cosine_similarity(&a.vector, &b.vector) {
        Ok(similarity) => similarity,
        Err(err) => {
            // Unusable vector pairs never merge.
            debug!(target: TARGET_CLUSTER, "Skipping comparison: {}", err);
            return false;
        }
    };

    if similarity > config.similarity_high_threshold {
        return true;
    }
    similarity > config.similarity_low_threshold && shares_technical_keyword(a, b)
}

/// Partitions the items into story clusters, returned as index groups into
/// the input slice. The first index of each group is the cluster's
/// representative. Deterministic for a fixed input order.
pub fn cluster_items(items: &[EmbeddedItem], config: &PipelineConfig) -> Vec<Vec<usize>> {
    let mut clusters: Vec<Vec<usize>> = Vec::new();

    for index in 0..items.len() {
        let item = &items[index];
        let mut matched = false;

        for cluster in clusters.iter_mut() {
            let joins = match config.linkage {
                LinkagePolicy::Representative => pair_merges(item, &items[cluster[0]], config),
                LinkagePolicy::AllMembers => cluster
                    .iter()
                    .any(|&member| pair_merges(item, &items[member], config)),
            };
            if joins {
                cluster.push(index);
                matched = true;
                break;
            }
        }

        if !matched {
            // Including the case of zero valid comparisons: the item opens
            // its own singleton cluster and becomes its representative.
            clusters.push(vec![index]);
        }
    }

    debug!(
        target: TARGET_CLUSTER,
        "Formed {} clusters from {} items",
        clusters.len(),
        items.len()
    );

    clusters
}
