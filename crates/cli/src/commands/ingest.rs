//! Ingestion command handlers.

use clap::Args;
use ragpilot_core::{config::AppConfig, AppResult};
use ragpilot_knowledge::{ExtensionSet, IngestStats};
use std::path::PathBuf;

/// Ingest the best-practices text file
#[derive(Args, Debug)]
pub struct IngestBestCommand {
    /// Path to the best-practices text file
    #[arg(long)]
    pub file: PathBuf,

    /// Drop the existing chunks of this corpus before adding the new ones
    #[arg(long)]
    pub replace: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestBestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest-best command for {:?}", self.file);

        let mut session = super::ingest_session(config)?;
        let stats = session
            .ingest_best_practices(&self.file, self.replace)
            .await?;

        print_stats(&stats, self.json)
    }
}

/// Ingest a source-code directory
#[derive(Args, Debug)]
pub struct IngestCodeCommand {
    /// Root directory of the code to ingest
    #[arg(long)]
    pub dir: PathBuf,

    /// Comma-separated extensions (e.g. .py,.md,.txt)
    #[arg(long)]
    pub ext: Option<String>,

    /// Drop the existing chunks of this corpus before adding the new ones
    #[arg(long)]
    pub replace: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCodeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest-code command for {:?}", self.dir);

        // Validate the filter before touching the filesystem or the network
        let extensions = match &self.ext {
            Some(list) => ExtensionSet::parse(list)?,
            None => ExtensionSet::from_items(&config.knowledge.code_extensions)?,
        };

        let mut session = super::ingest_session(config)?;
        let stats = session
            .ingest_code(&self.dir, &extensions, self.replace)
            .await?;

        print_stats(&stats, self.json)
    }
}

fn print_stats(stats: &IngestStats, json: bool) -> AppResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
    } else {
        println!(
            "Indexed {} chunks from {} file(s) into '{}' ({} total, {} bytes) in {:.2}s",
            stats.chunks_added,
            stats.files_count,
            stats.corpus,
            stats.total_chunks,
            stats.bytes_processed,
            stats.duration_secs
        );
    }
    Ok(())
}
