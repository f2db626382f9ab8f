//! Interactive chat loop.
//!
//! Reads one question per line from stdin until an exit keyword or EOF.
//! The session is kept for the whole loop, so the corpora load only once.

use clap::Args;
use ragpilot_core::{config::AppConfig, AppResult};
use std::io::{BufRead, Write};

/// Words that end the loop (case-insensitive).
const EXIT_KEYWORDS: [&str; 3] = ["exit", "quit", "sair"];

/// Start an interactive question loop
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Print the retrieved chunks before each answer
    #[arg(long)]
    pub show_context: bool,
}

/// What to do with one input line.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Skip,
    Exit,
    Question(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        Input::Skip
    } else if EXIT_KEYWORDS.iter().any(|k| line.eq_ignore_ascii_case(k)) {
        Input::Exit
    } else {
        Input::Question(line)
    }
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let mut session = super::answer_session(config)?;

        println!(
            "RAG chat: type your question ({} to leave).",
            EXIT_KEYWORDS.join("/")
        );

        let stdin = std::io::stdin();
        let mut lines = stdin.lock().lines();

        loop {
            print!(">> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next() else {
                println!();
                break;
            };
            let line = line?;

            let question = match classify(&line) {
                Input::Skip => continue,
                Input::Exit => break,
                Input::Question(q) => q,
            };

            match session.ask(question).await {
                Ok(answer) => {
                    if self.show_context {
                        super::ask::print_context(&answer);
                    }
                    println!("\n=== Answer ===\n{}\n", answer.answer);
                }
                // Index problems will not fix themselves between questions
                Err(e) if e.requires_reset() => return Err(e),
                Err(e) => {
                    tracing::error!("Question failed: {}", e);
                    eprintln!("Error: {}", e);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("   "), Input::Skip);
        assert_eq!(classify("exit"), Input::Exit);
        assert_eq!(classify(" QUIT "), Input::Exit);
        assert_eq!(classify("sair"), Input::Exit);
        assert_eq!(
            classify("  does foo.py log?  "),
            Input::Question("does foo.py log?")
        );
        assert_eq!(classify("exit now"), Input::Question("exit now"));
    }
}
