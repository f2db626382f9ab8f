//! Command handlers for the ragpilot CLI.
//!
//! Each command lives in its own submodule. The helpers here build the
//! session a command needs, checking credentials before any network call.

pub mod ask;
pub mod chat;
pub mod ingest;
pub mod reset;
pub mod stats;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use ingest::{IngestBestCommand, IngestCodeCommand};
pub use reset::ResetCommand;
pub use stats::StatsCommand;

use ragpilot_core::{config::AppConfig, AppResult};
use ragpilot_knowledge::Session;

/// Session able to embed, for ingestion.
pub fn ingest_session(config: &AppConfig) -> AppResult<Session> {
    Session::from_app_config(config)?.with_configured_embedder(config)
}

/// Session able to embed and generate, for `ask` and `chat`.
pub fn answer_session(config: &AppConfig) -> AppResult<Session> {
    let client = ragpilot_llm::create_client(
        &config.provider,
        config.endpoint.as_deref(),
        config.api_key.as_deref(),
    )?;

    tracing::debug!(
        "Using provider '{}' with model '{}'",
        client.provider_name(),
        config.model
    );

    Ok(ingest_session(config)?.with_generator(client, config.model.clone()))
}
