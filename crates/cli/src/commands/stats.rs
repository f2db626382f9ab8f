//! Stats command handler.
//!
//! Shows what each persisted corpus holds.

use clap::Args;
use ragpilot_core::{config::AppConfig, AppResult};
use ragpilot_knowledge::Session;

/// Show per-corpus index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let mut session = Session::from_app_config(config)?;
        let stats = session.stats()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }

        for corpus in &stats {
            let dimension = corpus
                .dimension
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<15} chunks: {:<6} dimension: {:<6} vectors: {} bytes, chunks: {} bytes",
                corpus.corpus,
                corpus.chunks_count,
                dimension,
                corpus.vectors_bytes,
                corpus.chunks_bytes
            );
        }

        Ok(())
    }
}
