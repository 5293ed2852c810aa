//! The embedding boundary: an injectable text -> vector capability.
//!
//! The provider is treated as an external, rate-limited, possibly-failing
//! dependency. The only requirement placed on it is that semantically similar
//! text embeds to vectors with high cosine similarity. Tests substitute a
//! deterministic stub.

pub mod batch;
pub mod client;

pub use batch::{embed_items, EmbedFailed, EmbedOutcome};
pub use client::OpenAiEmbedder;

use anyhow::Result;
use async_trait::async_trait;

use crate::normalize::CandidateItem;

/// Pure-function embedding boundary.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Text submitted for embedding. The title carries most of the story
/// identity for short news items, so it is weighted over the summary by
/// repetition.
pub fn embedding_text(item: &CandidateItem) -> String {
    format!(
        "{}\n{}\n{}\n{}",
        item.title, item.title, item.title, item.summary
    )
}
