//! On-disk locations of the persisted corpora.

use crate::types::Corpus;
use std::path::{Path, PathBuf};

/// Name of the state directory inside the workspace.
pub const STATE_DIR: &str = ".ragpilot";

/// Vector file name inside a corpus directory.
pub const VECTORS_FILE: &str = "vectors.bin";

/// Chunk file name inside a corpus directory.
pub const CHUNKS_FILE: &str = "chunks.jsonl";

/// Get the directory holding one corpus.
pub fn corpus_dir(workspace: &Path, corpus: Corpus) -> PathBuf {
    workspace.join(STATE_DIR).join(corpus.dir_name())
}

pub fn vectors_path(dir: &Path) -> PathBuf {
    dir.join(VECTORS_FILE)
}

pub fn chunks_path(dir: &Path) -> PathBuf {
    dir.join(CHUNKS_FILE)
}
