//! The normalization pass: validates, cleans, and classifies raw records.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, warn};

use super::html::{strip_markup, truncate_chars};
use super::types::{CandidateItem, MalformedItem, RawItem, SourceTier, Whitelist};
use super::util::{canonical_url, item_id, normalize_source_name, parse_date, url_host};
use super::SUMMARY_MAX_CHARS;
use crate::keywords::KeywordMatcher;
use crate::TARGET_PIPELINE;

/// Result of normalizing one batch of raw records.
#[derive(Debug, Default)]
pub struct NormalizeOutcome {
    /// Items passing keyword qualification, in input order.
    pub qualifying: Vec<CandidateItem>,
    /// Items retained but excluded from clustering; the caller decides
    /// whether to surface them as low-priority filler.
    pub non_qualifying: Vec<CandidateItem>,
    /// URLs excluded by the delist/ban lists.
    pub delisted: Vec<String>,
    /// Records rejected for missing or invalid required fields.
    pub failures: Vec<MalformedItem>,
}

fn resolve_tier(source_name: &str, host: Option<&str>, whitelist: &Whitelist) -> SourceTier {
    if let Some(entry) = whitelist.entry(source_name) {
        return entry.tier;
    }
    if let Some(host) = host {
        if whitelist
            .priority_domains
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{}", domain)))
        {
            return SourceTier::Priority;
        }
    }
    SourceTier::Standard
}

fn is_delisted(source_name: &str, host: Option<&str>, whitelist: &Whitelist) -> bool {
    if let Some(host) = host {
        if whitelist
            .delist_domains
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{}", domain)))
        {
            return true;
        }
    }
    let normalized = normalize_source_name(source_name);
    whitelist
        .banned_sources
        .iter()
        .any(|banned| normalize_source_name(banned) == normalized)
}

/// Canonicalizes a batch of raw records.
///
/// Identical URLs are deduplicated here, before any embedding call is made;
/// malformed records are collected rather than aborting the run.
pub fn normalize_items(
    raw_items: Vec<RawItem>,
    whitelist: &Whitelist,
    matcher: &KeywordMatcher,
    now: DateTime<Utc>,
) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome::default();
    let mut seen_urls: HashSet<String> = HashSet::new();

    for (index, raw) in raw_items.into_iter().enumerate() {
        let url = match raw.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => {
                outcome.failures.push(MalformedItem {
                    id: format!("input[{}]", index),
                    reason: "missing url".to_string(),
                });
                continue;
            }
        };

        let canonical = match canonical_url(&url) {
            Some(canonical) => canonical,
            None => {
                outcome.failures.push(MalformedItem {
                    id: format!("input[{}]", index),
                    reason: format!("invalid url: {}", url),
                });
                continue;
            }
        };

        // Exact-match short-circuit: first occurrence of a URL wins, and a
        // duplicate is never re-reported as malformed.
        if seen_urls.contains(&canonical) {
            debug!(target: TARGET_PIPELINE, "Skipping duplicate URL: {}", canonical);
            continue;
        }

        let title = match raw.title.as_deref().map(strip_markup) {
            Some(title) if !title.is_empty() => title,
            _ => {
                outcome.failures.push(MalformedItem {
                    id: item_id(&canonical),
                    reason: "missing title".to_string(),
                });
                continue;
            }
        };

        seen_urls.insert(canonical.clone());

        let host = url_host(&canonical);
        let source_name = match raw.source_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => host.clone().unwrap_or_else(|| "unknown".to_string()),
        };

        if is_delisted(&source_name, host.as_deref(), whitelist) {
            debug!(target: TARGET_PIPELINE, "Delisted source {} for {}", source_name, canonical);
            outcome.delisted.push(canonical);
            continue;
        }

        let published_at = match raw.published_at.as_deref().and_then(parse_date) {
            Some(date) => date,
            None => {
                warn!(
                    target: TARGET_PIPELINE,
                    "No parseable date for {}, falling back to run time", canonical
                );
                now
            }
        };

        let summary = raw
            .summary
            .as_deref()
            .map(strip_markup)
            .map(|s| truncate_chars(&s, SUMMARY_MAX_CHARS))
            .unwrap_or_default();

        let combined = format!("{} {}", title, summary);
        let qualifies = matcher.qualifies(&combined);
        let technical_keywords = matcher.technical_matches(&combined);
        let tier = resolve_tier(&source_name, host.as_deref(), whitelist);

        let item = CandidateItem {
            id: item_id(&canonical),
            title,
            summary,
            source_name,
            tier,
            published_at,
            url: canonical,
            qualifies,
            technical_keywords,
        };

        if item.qualifies {
            outcome.qualifying.push(item);
        } else {
            outcome.non_qualifying.push(item);
        }
    }

    outcome
}
