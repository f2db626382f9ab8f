//! Corpus index: a [`VectorIndex`] plus the chunk payloads aligned with it.
//!
//! Row `i` of the vector index always describes `chunks[i]`. Both halves are
//! written to the corpus directory with a temp-file-then-rename so a reader
//! never observes a partially written file.

use crate::config::{chunks_path, vectors_path};
use crate::types::{Chunk, Corpus, CorpusStats, ScoredChunk};
use crate::vector_index::VectorIndex;
use ragpilot_core::{AppError, AppResult};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// One corpus held in memory.
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    corpus: Corpus,
    index: VectorIndex,
    chunks: Vec<Chunk>,
}

impl CorpusIndex {
    pub fn new(corpus: Corpus) -> Self {
        Self {
            corpus,
            index: VectorIndex::new(),
            chunks: Vec::new(),
        }
    }

    pub fn corpus(&self) -> Corpus {
        self.corpus
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.index.dimension()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Append chunks with their vectors.
    ///
    /// Nothing is appended unless every vector matches the index dimension
    /// and there is exactly one vector per chunk.
    pub fn add(&mut self, vectors: Vec<Vec<f32>>, chunks: Vec<Chunk>) -> AppResult<()> {
        if vectors.len() != chunks.len() {
            return Err(AppError::Knowledge(format!(
                "Got {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        self.index.add(&vectors)?;
        self.chunks.extend(chunks);

        tracing::debug!(
            "Corpus '{}' now holds {} chunks",
            self.corpus,
            self.chunks.len()
        );
        Ok(())
    }

    /// Top `k` chunks for an already normalized query vector.
    pub fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<ScoredChunk>> {
        let hits = self.index.search(query, k)?;
        Ok(hits
            .into_iter()
            .filter_map(|(row, score)| {
                self.chunks.get(row).map(|chunk| ScoredChunk {
                    chunk: chunk.clone(),
                    score,
                })
            })
            .collect())
    }

    /// Discard every row and the dimension.
    pub fn reset(&mut self) {
        self.index.reset();
        self.chunks.clear();
    }

    /// Write both files into `dir`, creating it if needed.
    pub fn persist(&self, dir: &Path) -> AppResult<()> {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::Knowledge(format!("Failed to create corpus directory {:?}: {}", dir, e))
        })?;

        write_atomic(&vectors_path(dir), &self.index.to_bytes()?)?;

        let mut lines = Vec::new();
        for chunk in &self.chunks {
            serde_json::to_writer(&mut lines, chunk)?;
            lines.push(b'\n');
        }
        write_atomic(&chunks_path(dir), &lines)?;

        tracing::info!(
            "Persisted corpus '{}' ({} chunks) to {:?}",
            self.corpus,
            self.chunks.len(),
            dir
        );
        Ok(())
    }

    /// Load a corpus from `dir`.
    ///
    /// Missing files count as an empty corpus. Files that disagree on the
    /// number of rows are reported as corrupted.
    pub fn load(corpus: Corpus, dir: &Path) -> AppResult<Self> {
        let vectors_file = vectors_path(dir);
        let chunks_file = chunks_path(dir);

        let index = if vectors_file.exists() {
            let bytes = fs::read(&vectors_file)?;
            VectorIndex::from_bytes(&bytes).map_err(|e| {
                AppError::Knowledge(format!("Failed to read {:?}: {}", vectors_file, e))
            })?
        } else {
            VectorIndex::new()
        };

        let chunks = if chunks_file.exists() {
            read_chunks(&chunks_file)?
        } else {
            Vec::new()
        };

        if index.len() != chunks.len() {
            return Err(AppError::CorruptedPersistedState {
                path: dir.to_path_buf(),
                vectors: index.len(),
                chunks: chunks.len(),
            });
        }

        tracing::debug!("Loaded corpus '{}' with {} chunks", corpus, chunks.len());

        Ok(Self {
            corpus,
            index,
            chunks,
        })
    }

    /// In-memory counts plus the size of the files in `dir`.
    pub fn stats(&self, dir: &Path) -> CorpusStats {
        let file_len = |p: &Path| fs::metadata(p).map(|m| m.len()).unwrap_or(0);
        CorpusStats {
            corpus: self.corpus,
            chunks_count: self.chunks.len(),
            dimension: self.index.dimension(),
            vectors_bytes: file_len(&vectors_path(dir)),
            chunks_bytes: file_len(&chunks_path(dir)),
        }
    }
}

fn read_chunks(path: &Path) -> AppResult<Vec<Chunk>> {
    let reader = BufReader::new(fs::File::open(path)?);
    let mut chunks = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let chunk: Chunk = serde_json::from_str(&line).map_err(|e| {
            AppError::Knowledge(format!(
                "Invalid chunk at {:?} line {}: {}",
                path,
                line_no + 1,
                e
            ))
        })?;
        chunks.push(chunk);
    }

    Ok(chunks)
}

/// Write `contents` to a temp file beside `path`, then rename over it.
fn write_atomic(path: &Path, contents: &[u8]) -> AppResult<()> {
    let dir = path
        .parent()
        .ok_or_else(|| AppError::Knowledge(format!("No parent directory for {:?}", path)))?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| AppError::Io(e.error))?;
    Ok(())
}
