//! Retrieval-augmented answering: prompt assembly and generation.

pub mod ask;
pub mod prompt;
pub mod types;

pub use ask::{generate_answer, EMPTY_ANSWER};
pub use prompt::build_prompt;
pub use types::{RagAnswer, SourceRef};
