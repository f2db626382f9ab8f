//! Knowledge system type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker prefixed to every code chunk so the model can attribute content.
pub const FILE_MARKER: &str = "[FILE]:";

/// One of the two independent corpora.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corpus {
    /// The organization's best-practices document
    BestPractices,
    /// The source-code tree
    Code,
}

impl Corpus {
    /// Both corpora, in prompt order.
    pub const ALL: [Corpus; 2] = [Corpus::BestPractices, Corpus::Code];

    /// Directory name under `.ragpilot/`.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Corpus::BestPractices => "best-practices",
            Corpus::Code => "code",
        }
    }
}

impl fmt::Display for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.dir_name())
    }
}

/// A stored text chunk.
///
/// Immutable once added to a corpus. Code chunks carry the `[FILE]:`
/// marker line at the start of `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content (embedded as-is)
    pub text: String,

    /// Source file, relative to the ingested root, with `/` separators
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    /// Position of this window within its source
    pub sequence_index: usize,
}

impl Chunk {
    /// Chunk with no file origin (best-practices text).
    pub fn new(text: impl Into<String>, sequence_index: usize) -> Self {
        Self {
            text: text.into(),
            origin: None,
            sequence_index,
        }
    }

    /// Code chunk: prefixes `text` with the `[FILE]: <origin>` marker line.
    pub fn from_file(origin: impl Into<String>, body: &str, sequence_index: usize) -> Self {
        let origin = origin.into();
        Self {
            text: format!("{} {}\n{}", FILE_MARKER, origin, body),
            origin: Some(origin),
            sequence_index,
        }
    }
}

/// A chunk paired with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Per-corpus retrieval results, each ordered by descending score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Retrieval {
    pub best_practices: Vec<ScoredChunk>,
    pub code: Vec<ScoredChunk>,
}

impl Retrieval {
    /// True when neither corpus contributed context.
    pub fn is_empty(&self) -> bool {
        self.best_practices.is_empty() && self.code.is_empty()
    }
}

/// Statistics from an ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestStats {
    /// Corpus that was written
    pub corpus: Corpus,

    /// Number of files read
    pub files_count: usize,

    /// Number of chunks added by this run
    pub chunks_added: usize,

    /// Rows in the corpus after the run
    pub total_chunks: usize,

    /// Total bytes read
    pub bytes_processed: u64,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Statistics for a persisted corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusStats {
    pub corpus: Corpus,

    /// Number of chunks
    pub chunks_count: usize,

    /// Embedding dimension, if any vector has been stored
    pub dimension: Option<usize>,

    /// Size of the vector file in bytes
    pub vectors_bytes: u64,

    /// Size of the chunk file in bytes
    pub chunks_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_chunk_has_file_marker() {
        let chunk = Chunk::from_file("src/foo.py", "def foo():\n    pass\n", 0);
        assert!(chunk.text.starts_with("[FILE]: src/foo.py\n"));
        assert!(chunk.text.ends_with("pass\n"));
        assert_eq!(chunk.origin.as_deref(), Some("src/foo.py"));
    }

    #[test]
    fn test_chunk_serialization_omits_missing_origin() {
        let json = serde_json::to_string(&Chunk::new("text", 3)).unwrap();
        assert_eq!(json, r#"{"text":"text","sequence_index":3}"#);
    }

    #[test]
    fn test_corpus_names() {
        assert_eq!(Corpus::BestPractices.to_string(), "best-practices");
        assert_eq!(Corpus::Code.dir_name(), "code");
    }
}
