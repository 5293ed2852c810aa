//! Utility functions for item normalization.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Canonical form of a URL used for exact-match deduplication and id hashing.
/// Non-http(s) schemes and unparseable strings are rejected.
pub fn canonical_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url.trim()).ok()?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }
    Some(parsed.to_string())
}

/// Stable item id: truncated hex SHA-256 of the canonical URL.
pub fn item_id(canonical_url: &str) -> String {
    let digest = Sha256::digest(canonical_url.as_bytes());
    hex::encode(&digest[..16])
}

/// Host component of a URL, lowercased.
pub fn url_host(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|h| h.to_lowercase()))
}

/// Normalizes a source name for whitelist lookups and ban matching.
pub fn normalize_source_name(name: &str) -> String {
    name.to_lowercase()
        .replace("the ", "")
        .replace(".com", "")
        .replace(".net", "")
        .trim()
        .to_string()
}

/// Parse a date string in various formats
pub fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339
    if let Ok(date) = DateTime::parse_from_rfc3339(date_str) {
        return Some(date.with_timezone(&Utc));
    }

    // Try RFC2822
    if let Ok(date) = DateTime::parse_from_rfc2822(date_str) {
        return Some(date.with_timezone(&Utc));
    }

    // Try ISO 8601
    if let Ok(date) = DateTime::parse_from_str(date_str, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(date.with_timezone(&Utc));
    }

    // Try common date-only and date-time formats (assumed UTC)
    for format in &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d", "%m-%d-%Y", "%m/%d/%Y"] {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(date_str, format) {
            return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
        if let Ok(naive_date) = chrono::NaiveDate::parse_from_str(date_str, format) {
            let naive = naive_date.and_hms_opt(0, 0, 0)?;
            return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
    }

    None
}
