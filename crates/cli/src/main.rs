//! ragpilot CLI
//!
//! Main entry point for the ragpilot command-line tool.
//! Ingests a best-practices document and a code tree, then answers
//! questions grounded in both.

mod commands;

use clap::{Parser, Subcommand};
use commands::{
    AskCommand, ChatCommand, IngestBestCommand, IngestCodeCommand, ResetCommand, StatsCommand,
};
use ragpilot_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;
use tracing::Instrument;

/// ragpilot - retrieval-augmented engineering copilot
#[derive(Parser, Debug)]
#[command(name = "ragpilot")]
#[command(about = "Answer questions grounded in your best practices and code", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "RAGPILOT_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "RAGPILOT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Generation model identifier
    #[arg(short, long, global = true, env = "GEMINI_CHAT_MODEL")]
    model: Option<String>,

    /// Embedding model identifier
    #[arg(long, global = true, env = "GEMINI_EMBED_MODEL")]
    embedding_model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest the best-practices text file
    IngestBest(IngestBestCommand),

    /// Ingest a source-code directory
    IngestCode(IngestCodeCommand),

    /// Ask a single question
    Ask(AskCommand),

    /// Interactive question loop
    Chat(ChatCommand),

    /// Remove both persisted indexes
    Reset(ResetCommand),

    /// Show per-corpus index statistics
    Stats(StatsCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::IngestBest(_) => "ingest-best",
            Commands::IngestCode(_) => "ingest-code",
            Commands::Ask(_) => "ask",
            Commands::Chat(_) => "chat",
            Commands::Reset(_) => "reset",
            Commands::Stats(_) => "stats",
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let config = AppConfig::load_with(cli.workspace.clone(), cli.config.clone())?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.model,
        cli.embedding_model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("ragpilot starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!(
        "Provider: {} (model: {}), embeddings: {} (model: {})",
        config.provider,
        config.model,
        config.embedding_provider,
        config.embedding_model
    );

    config.validate()?;

    let span = tracing::info_span!("command", name = cli.command.name());

    async move {
        let result = match cli.command {
            Commands::IngestBest(cmd) => cmd.execute(&config).await,
            Commands::IngestCode(cmd) => cmd.execute(&config).await,
            Commands::Ask(cmd) => cmd.execute(&config).await,
            Commands::Chat(cmd) => cmd.execute(&config).await,
            Commands::Reset(cmd) => cmd.execute(&config).await,
            Commands::Stats(cmd) => cmd.execute(&config).await,
        };

        match &result {
            Ok(_) => tracing::info!("Command completed successfully"),
            Err(e) => tracing::error!("Command failed: {}", e),
        }

        result
    }
    .instrument(span)
    .await
}
