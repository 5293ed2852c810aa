use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use newsforge::config::PipelineConfig;
use newsforge::embedding::OpenAiEmbedder;
use newsforge::logging::configure_logging;
use newsforge::normalize::{RawItem, Whitelist};
use newsforge::pipeline;
use newsforge::TARGET_PIPELINE;

/// Deduplicates and ranks one batch of pre-fetched news items.
///
/// Reads raw items and source metadata from JSON files, clusters duplicate
/// coverage via embedding similarity, and writes the ranked clusters plus
/// per-item failures as JSON for the caller to persist.
#[derive(Parser, Debug)]
#[command(name = "newsforge", version)]
struct Args {
    /// Raw item records (JSON array).
    #[arg(long)]
    input: PathBuf,

    /// Whitelist / tier / delist configuration (JSON).
    #[arg(long)]
    whitelist: Option<PathBuf>,

    /// Pipeline configuration (JSON); defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output path for the run result (JSON).
    #[arg(long)]
    output: PathBuf,

    /// Override the dispatch date key (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    dispatch_date: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> Result<()> {
    configure_logging();
    let args = Args::parse();

    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read input file {}", args.input.display()))?;
    let items: Vec<RawItem> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse input file {}", args.input.display()))?;

    let whitelist = match &args.whitelist {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read whitelist file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse whitelist file {}", path.display()))?
        }
        None => Whitelist::default(),
    };

    let config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };

    let api_key =
        env::var("OPENAI_API_KEY").context("OPENAI_API_KEY environment variable required")?;
    let embedder = OpenAiEmbedder::new(api_key);

    let now = Utc::now();
    info!(target: TARGET_PIPELINE, "Starting run over {} raw items", items.len());

    let mut output = pipeline::run(&config, &whitelist, items, &embedder, now).await?;
    if let Some(date) = args.dispatch_date {
        output.dispatch_date = date;
    }

    info!(
        target: TARGET_PIPELINE,
        "Writing {} clusters ({} spotlight), {} non-qualifying, {} failures to {}",
        output.clusters.len(),
        output.spotlight().len(),
        output.non_qualifying.len(),
        output.failures.len(),
        args.output.display()
    );

    let serialized = serde_json::to_string_pretty(&output)?;
    fs::write(&args.output, serialized)
        .with_context(|| format!("Failed to write output file {}", args.output.display()))?;

    Ok(())
}
