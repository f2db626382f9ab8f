//! Grounding prompt assembly.
//!
//! The prompt is rendered from a fixed Handlebars template: instruction
//! block, best-practices context, code context, then the question verbatim.

use crate::types::ScoredChunk;
use handlebars::Handlebars;
use ragpilot_core::{AppError, AppResult};
use serde::Serialize;

/// Placeholder for an empty best-practices section.
pub const NO_BEST_PRACTICES: &str = "(no best-practices context available)";

/// Placeholder for an empty code section.
pub const NO_CODE: &str = "(no code context available)";

const SEPARATOR: &str = "\n\n---\n";

const INSTRUCTIONS: &str = "You are a software engineering copilot that answers using retrieved context.\n\
Answer STRICTLY from the context provided below.\n\
If the answer is not in the context, say clearly that you don't know.\n\
When referring to code, cite the file as it appears in the context: [FILE]: <path>.\n\
When making recommendations, align them with the best practices where available.";

const TEMPLATE: &str = "{{instructions}}

# CONTEXT: BEST PRACTICES
{{best_practices}}

# CONTEXT: CODE
{{code}}

# QUESTION
{{question}}

Answer objectively. If useful, list actionable steps.";

#[derive(Serialize)]
struct PromptVars<'a> {
    instructions: &'a str,
    best_practices: String,
    code: String,
    question: &'a str,
}

/// Build the grounding prompt for `question`.
///
/// Deterministic: the same inputs always render the same text.
pub fn build_prompt(
    question: &str,
    best_practices: &[ScoredChunk],
    code: &[ScoredChunk],
) -> AppResult<String> {
    let best_practices = if best_practices.is_empty() {
        NO_BEST_PRACTICES.to_string()
    } else {
        best_practices
            .iter()
            .enumerate()
            .map(|(i, c)| format!("[{}] {}", i + 1, c.chunk.text))
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    };

    let code = if code.is_empty() {
        NO_CODE.to_string()
    } else {
        code.iter()
            .map(|c| c.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    };

    let vars = PromptVars {
        instructions: INSTRUCTIONS,
        best_practices,
        code,
        question,
    };

    render(&vars)
}

fn render(vars: &PromptVars<'_>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", TEMPLATE)
        .map_err(|e| AppError::Knowledge(format!("Failed to register prompt template: {}", e)))?;

    handlebars
        .render("prompt", vars)
        .map_err(|e| AppError::Knowledge(format!("Failed to render prompt: {}", e)))
}
