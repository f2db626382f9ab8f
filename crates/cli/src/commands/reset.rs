//! Reset command handler.

use clap::Args;
use ragpilot_core::{config::AppConfig, AppResult};
use ragpilot_knowledge::Session;

/// Remove both persisted indexes
#[derive(Args, Debug)]
pub struct ResetCommand {}

impl ResetCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing reset command");

        let mut session = Session::from_app_config(config)?;
        session.reset()?;

        println!("Removed best-practices and code indexes.");
        Ok(())
    }
}
