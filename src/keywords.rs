//! Keyword-density qualification and technical keyword extraction.
//!
//! Qualification is a pass/fail gate independent of clustering: an item
//! qualifies when it mentions the configured brand keywords often enough.
//! Technical keywords are the rarer, more specific terms used only to raise
//! confidence on moderate-similarity cluster merges.

use anyhow::{Context, Result};
use regex::Regex;

use crate::config::PipelineConfig;

/// Precompiled whole-word matchers for the configured keyword sets.
pub struct KeywordMatcher {
    strong: Vec<Regex>,
    weak: Vec<Regex>,
    technical: Vec<(String, Regex)>,
    min_strong_hits: usize,
    min_weak_hits: usize,
}

fn whole_word(keyword: &str) -> Result<Regex> {
    let pattern = format!(r"(?i)\b{}\b", regex::escape(keyword));
    Regex::new(&pattern).with_context(|| format!("Invalid keyword pattern: {}", keyword))
}

impl KeywordMatcher {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let strong = config
            .strong_keywords
            .iter()
            .map(|k| whole_word(k))
            .collect::<Result<Vec<_>>>()?;
        let weak = config
            .weak_keywords
            .iter()
            .map(|k| whole_word(k))
            .collect::<Result<Vec<_>>>()?;
        let technical = config
            .technical_keywords
            .iter()
            .map(|k| Ok((k.to_lowercase(), whole_word(k)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            strong,
            weak,
            technical,
            min_strong_hits: config.min_strong_hits,
            min_weak_hits: config.min_weak_hits,
        })
    }

    /// Counts whole-word occurrences across a keyword set.
    fn hits(patterns: &[Regex], text: &str) -> usize {
        patterns.iter().map(|re| re.find_iter(text).count()).sum()
    }

    /// True when the text meets the configured keyword density.
    pub fn qualifies(&self, text: &str) -> bool {
        if !self.strong.is_empty() && Self::hits(&self.strong, text) >= self.min_strong_hits {
            return true;
        }
        !self.weak.is_empty() && Self::hits(&self.weak, text) >= self.min_weak_hits
    }

    /// Technical lexicon terms present in the text, lowercased for stable
    /// overlap comparisons during clustering.
    pub fn technical_matches(&self, text: &str) -> Vec<String> {
        self.technical
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(term, _)| term.clone())
            .collect()
    }
}
