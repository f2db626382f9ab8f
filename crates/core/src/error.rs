//! Error types for the ragpilot CLI.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! external service, and knowledge-index failures. The index-specific
//! variants carry enough detail for the CLI to tell the user what to do next.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for ragpilot.
///
/// All functions in the workspace return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (missing credential, bad settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generation or embedding service errors (network, HTTP status)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Knowledge base errors that do not fit a more specific variant
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// The embedding service answered with a shape we do not recognize
    #[error("Malformed embedding response: {0}")]
    MalformedEmbeddingResponse(String),

    /// A vector does not match the dimension fixed for the index
    #[error(
        "Embedding dimension mismatch: index expects {expected}, got {actual}. Run 'ragpilot reset' and ingest again."
    )]
    DimensionMismatch { expected: usize, actual: usize },

    /// Search against an index that holds no rows
    #[error("Index is empty")]
    EmptyIndex,

    /// Vector file and chunk file disagree on row count
    #[error(
        "Corrupted index at {path:?}: {vectors} vectors but {chunks} chunks. Run 'ragpilot reset' and ingest again."
    )]
    CorruptedPersistedState {
        path: PathBuf,
        vectors: usize,
        chunks: usize,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether the user may simply retry the operation.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Llm(_))
    }

    /// Whether the error can only be fixed by resetting the persisted indexes.
    pub fn requires_reset(&self) -> bool {
        matches!(
            self,
            AppError::DimensionMismatch { .. } | AppError::CorruptedPersistedState { .. }
        )
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
