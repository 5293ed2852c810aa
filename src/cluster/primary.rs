//! Primary selection: choosing the canonical item within a cluster.

use std::cmp::Reverse;

use crate::normalize::{CandidateItem, Whitelist};

/// Picks the index of the cluster's canonical item.
///
/// Tie-break order, first distinguishing criterion wins:
/// 1. Source tier (verified > priority > standard).
/// 2. Whitelist "primary outlet" flag.
/// 3. Earliest publication time (original reporting predates derivatives).
/// 4. Lexicographically smallest id, guaranteeing determinism.
pub fn select_primary(members: &[&CandidateItem], whitelist: &Whitelist) -> usize {
    members
        .iter()
        .enumerate()
        .min_by_key(|(_, item)| {
            let primary_outlet = whitelist
                .entry(&item.source_name)
                .map(|entry| entry.primary_outlet)
                .unwrap_or(false);
            (
                Reverse(item.tier),
                Reverse(primary_outlet),
                item.published_at,
                item.id.clone(),
            )
        })
        .map(|(index, _)| index)
        .expect("cluster members are never empty")
}
