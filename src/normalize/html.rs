//! Markup stripping for feed-supplied titles and summaries.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strips HTML tags, decodes entities, and collapses whitespace.
pub fn strip_markup(raw: &str) -> String {
    let without_tags = TAG_RE.replace_all(raw, " ");
    let decoded = html_escape::decode_html_entities(without_tags.as_ref());
    WHITESPACE_RE
        .replace_all(decoded.trim(), " ")
        .into_owned()
}

/// Truncates on a `char` boundary. Combining sequences may still be split;
/// acceptable for a display summary that is already lossy.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}
