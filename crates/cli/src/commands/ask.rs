//! Ask command handler.
//!
//! Answers a single question from the ingested corpora and exits.

use clap::Args;
use ragpilot_core::{config::AppConfig, AppResult};
use ragpilot_knowledge::RagAnswer;

/// Ask a single question (non-interactive)
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to answer
    #[arg(long)]
    pub question: String,

    /// Print the retrieved chunks before the answer
    #[arg(long)]
    pub show_context: bool,

    /// Output answer and sources as JSON
    #[arg(long, conflicts_with = "show_context")]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let mut session = super::answer_session(config)?;
        let answer = session.ask(&self.question).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&answer)?);
            return Ok(());
        }

        if self.show_context {
            print_context(&answer);
        }
        println!("{}", answer.answer);

        Ok(())
    }
}

/// Print retrieved chunks grouped by corpus, in rank order.
pub fn print_context(answer: &RagAnswer) {
    if answer.sources.is_empty() {
        println!("(no context retrieved)\n");
        return;
    }

    for source in &answer.sources {
        println!(
            "=== {} #{} (score {:.3}) ===",
            source.corpus, source.rank, source.score
        );
        println!("{}\n", source.text);
    }
}
