//! Text chunking with configurable size and overlap.
//!
//! Windows are measured in characters (Unicode scalar values), so a window
//! never ends inside a UTF-8 sequence. Consecutive windows share exactly
//! `overlap` characters; only the last window may be shorter than
//! `window_size`.

use crate::types::Chunk;
use ragpilot_core::{AppError, AppResult, KnowledgeSettings};

/// Validated window configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkerConfig {
    window_size: usize,
    overlap: usize,
}

impl ChunkerConfig {
    /// Create a config, rejecting `window_size == 0` and `overlap >= window_size`.
    pub fn new(window_size: usize, overlap: usize) -> AppResult<Self> {
        if window_size == 0 {
            return Err(AppError::Config(
                "Chunk window size must be greater than 0".to_string(),
            ));
        }
        if overlap >= window_size {
            return Err(AppError::Config(format!(
                "Chunk overlap ({}) must be smaller than window size ({})",
                overlap, window_size
            )));
        }
        Ok(Self {
            window_size,
            overlap,
        })
    }

    /// Build from the application's knowledge settings.
    pub fn from_settings(settings: &KnowledgeSettings) -> AppResult<Self> {
        Self::new(settings.chunk_size, settings.chunk_overlap)
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Characters between the starts of consecutive windows.
    pub fn step(&self) -> usize {
        self.window_size - self.overlap
    }

    /// Lazily iterate the windows of `text`.
    pub fn windows<'a>(&self, text: &'a str) -> Windows<'a> {
        Windows {
            text,
            config: *self,
            start: Some(0),
        }
    }
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            window_size: 1200,
            overlap: 200,
        }
    }
}

/// Iterator over overlapping windows of a string slice.
///
/// Call [`ChunkerConfig::windows`] again to start over.
#[derive(Debug, Clone)]
pub struct Windows<'a> {
    text: &'a str,
    config: ChunkerConfig,
    /// Byte offset of the next window, `None` once exhausted.
    start: Option<usize>,
}

/// Byte offset `n` characters after `from`, clamped to the end of `text`.
fn advance_chars(text: &str, from: usize, n: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(n)
        .map(|(offset, _)| from + offset)
        .unwrap_or(text.len())
}

impl<'a> Iterator for Windows<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.start?;
        if start >= self.text.len() {
            self.start = None;
            return None;
        }

        let end = advance_chars(self.text, start, self.config.window_size);
        self.start = if end >= self.text.len() {
            None
        } else {
            Some(advance_chars(self.text, start, self.config.step()))
        };

        Some(&self.text[start..end])
    }
}

/// Collapse trailing whitespace and blank lines, then trim the text.
///
/// Indentation at the start of non-blank lines is kept.
pub fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Chunk best-practices text into ordered chunks without file origin.
pub fn chunk_text(text: &str, config: &ChunkerConfig) -> Vec<Chunk> {
    let chunks: Vec<Chunk> = config
        .windows(text)
        .enumerate()
        .map(|(i, window)| Chunk::new(window, i))
        .collect();

    tracing::debug!(
        "Chunked text into {} chunks (size: {}, overlap: {})",
        chunks.len(),
        config.window_size,
        config.overlap
    );

    chunks
}

/// Chunk a single source file; every chunk carries the `[FILE]:` marker.
///
/// Windows never span files because each file is chunked on its own.
pub fn chunk_code(origin: &str, content: &str, config: &ChunkerConfig) -> Vec<Chunk> {
    config
        .windows(content)
        .enumerate()
        .map(|(i, window)| Chunk::from_file(origin, window, i))
        .collect()
}
