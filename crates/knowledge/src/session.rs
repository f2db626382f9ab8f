//! Session controller.
//!
//! A [`Session`] owns both corpora for the life of the process. Each corpus
//! is loaded from disk the first time it is needed and written back after
//! every ingestion run. Ingestion appends; `reset` is the only way to drop
//! rows unless a caller explicitly asks to replace a corpus.

use crate::chunker::{chunk_code, chunk_text, normalize_whitespace, ChunkerConfig};
use crate::config::corpus_dir;
use crate::embeddings::{Embedder, EmbeddingConfig};
use crate::rag::{build_prompt, generate_answer, RagAnswer};
use crate::retriever::retrieve;
use crate::sources::{discover_files, read_text, ExtensionSet};
use crate::store::CorpusIndex;
use crate::types::{Chunk, Corpus, CorpusStats, IngestStats, Retrieval};
use ragpilot_core::{AppConfig, AppError, AppResult};
use ragpilot_llm::LlmClient;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Retrieval and chunking knobs for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub chunker: ChunkerConfig,
    pub top_k_best: usize,
    pub top_k_code: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            chunker: ChunkerConfig::default(),
            top_k_best: 4,
            top_k_code: 4,
        }
    }
}

impl SessionOptions {
    pub fn from_app_config(config: &AppConfig) -> AppResult<Self> {
        Ok(Self {
            chunker: ChunkerConfig::from_settings(&config.knowledge)?,
            top_k_best: config.knowledge.top_k_best,
            top_k_code: config.knowledge.top_k_code,
        })
    }
}

/// Generation client plus the model it should use.
#[derive(Clone)]
pub struct Generator {
    pub client: Arc<dyn LlmClient>,
    pub model: String,
}

/// Process-lifetime state: both corpora and the clients that feed them.
pub struct Session {
    workspace: PathBuf,
    embedder: Option<Embedder>,
    generator: Option<Generator>,
    options: SessionOptions,
    best_practices: Option<CorpusIndex>,
    code: Option<CorpusIndex>,
}

impl Session {
    /// Session without clients; enough for `reset` and `stats`.
    pub fn new(workspace: impl Into<PathBuf>, options: SessionOptions) -> Self {
        Self {
            workspace: workspace.into(),
            embedder: None,
            generator: None,
            options,
            best_practices: None,
            code: None,
        }
    }

    /// Build a client-less session from resolved configuration.
    pub fn from_app_config(config: &AppConfig) -> AppResult<Self> {
        let options = SessionOptions::from_app_config(config)?;
        Ok(Self::new(&config.workspace, options))
    }

    /// Attach the embedding adapter used by ingestion and retrieval.
    pub fn with_embedder(mut self, embedder: Embedder) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Attach the embedder described by `config`.
    ///
    /// Fails with a configuration error when a remote provider has no API
    /// key, before anything is sent.
    pub fn with_configured_embedder(self, config: &AppConfig) -> AppResult<Self> {
        let embedding = EmbeddingConfig::from_app_config(config);
        let embedder = Embedder::from_config(&embedding, config.api_key.as_deref())?;
        Ok(self.with_embedder(embedder))
    }

    /// Attach the client used by [`Session::ask`].
    pub fn with_generator(mut self, client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        self.generator = Some(Generator {
            client,
            model: model.into(),
        });
        self
    }

    fn embedder(&self) -> AppResult<&Embedder> {
        self.embedder.as_ref().ok_or_else(|| {
            AppError::Config("No embedding provider configured for this session".to_string())
        })
    }

    fn slot(&mut self, corpus: Corpus) -> &mut Option<CorpusIndex> {
        match corpus {
            Corpus::BestPractices => &mut self.best_practices,
            Corpus::Code => &mut self.code,
        }
    }

    /// Corpus in memory, loading it from disk on first access.
    pub fn corpus(&mut self, corpus: Corpus) -> AppResult<&mut CorpusIndex> {
        let dir = corpus_dir(&self.workspace, corpus);
        let slot = self.slot(corpus);
        if slot.is_none() {
            *slot = Some(CorpusIndex::load(corpus, &dir)?);
        }
        slot.as_mut()
            .ok_or_else(|| AppError::Other(format!("Corpus '{}' failed to load", corpus)))
    }

    /// Ingest the best-practices text file.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn ingest_best_practices(&mut self, path: &Path, replace: bool) -> AppResult<IngestStats> {
        let start = Instant::now();

        if !path.is_file() {
            return Err(AppError::Knowledge(format!("File not found: {:?}", path)));
        }

        let text = read_text(path)?;
        let bytes_processed = text.len() as u64;
        let chunks = chunk_text(&normalize_whitespace(&text), &self.options.chunker);

        if chunks.is_empty() {
            return Err(AppError::Knowledge(format!(
                "No chunks produced from {:?}; is the file empty?",
                path
            )));
        }

        self.store(Corpus::BestPractices, chunks, 1, bytes_processed, replace, start)
            .await
    }

    /// Ingest every matching file under `dir`.
    #[instrument(skip(self, dir, extensions), fields(dir = %dir.display(), extensions = %extensions))]
    pub async fn ingest_code(
        &mut self,
        dir: &Path,
        extensions: &ExtensionSet,
        replace: bool,
    ) -> AppResult<IngestStats> {
        let start = Instant::now();

        let files = discover_files(dir, extensions)?;
        if files.is_empty() {
            return Err(AppError::Knowledge(format!(
                "No files with extensions {} found in {:?}",
                extensions, dir
            )));
        }

        let mut chunks = Vec::new();
        let mut files_count = 0usize;
        let mut bytes_processed = 0u64;

        for file in &files {
            let content = match read_text(&file.path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", file.relative, e);
                    continue;
                }
            };

            files_count += 1;
            bytes_processed += content.len() as u64;
            let file_chunks = chunk_code(
                &file.relative,
                &normalize_whitespace(&content),
                &self.options.chunker,
            );
            tracing::debug!("{}: {} chunks", file.relative, file_chunks.len());
            chunks.extend(file_chunks);
        }

        if chunks.is_empty() {
            return Err(AppError::Knowledge(format!(
                "No code chunks produced from {:?}; are the files empty?",
                dir
            )));
        }

        self.store(Corpus::Code, chunks, files_count, bytes_processed, replace, start)
            .await
    }

    /// Embed chunks, append them to the corpus and persist it.
    ///
    /// With `replace` the existing rows are dropped first. Embedding happens
    /// before any mutation, so a failed request leaves both memory and disk
    /// untouched.
    async fn store(
        &mut self,
        corpus: Corpus,
        chunks: Vec<Chunk>,
        files_count: usize,
        bytes_processed: u64,
        replace: bool,
        start: Instant,
    ) -> AppResult<IngestStats> {
        tracing::info!("Embedding {} chunks for corpus '{}'", chunks.len(), corpus);

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder()?.embed_texts(&texts).await?;
        let chunks_added = chunks.len();

        let mut updated = if replace {
            tracing::info!("Replacing existing rows of corpus '{}'", corpus);
            CorpusIndex::new(corpus)
        } else {
            self.corpus(corpus)?.clone()
        };
        updated.add(vectors, chunks)?;
        updated.persist(&corpus_dir(&self.workspace, corpus))?;

        let total_chunks = updated.len();
        *self.slot(corpus) = Some(updated);

        let duration = start.elapsed();
        tracing::info!(
            "Ingested {} chunks into '{}' ({} total) in {:.2}s",
            chunks_added,
            corpus,
            total_chunks,
            duration.as_secs_f64()
        );

        Ok(IngestStats {
            corpus,
            files_count,
            chunks_added,
            total_chunks,
            bytes_processed,
            duration_secs: duration.as_secs_f64(),
        })
    }

    /// Retrieve context for `question` from both corpora.
    pub async fn retrieve(&mut self, question: &str) -> AppResult<Retrieval> {
        self.corpus(Corpus::BestPractices)?;
        self.corpus(Corpus::Code)?;

        let embedder = self.embedder()?;
        let (Some(best_practices), Some(code)) = (&self.best_practices, &self.code) else {
            return Err(AppError::Other("Corpora failed to load".to_string()));
        };

        retrieve(
            embedder,
            best_practices,
            code,
            question,
            self.options.top_k_best,
            self.options.top_k_code,
        )
        .await
    }

    /// Answer one question grounded in both corpora.
    #[instrument(skip(self))]
    pub async fn ask(&mut self, question: &str) -> AppResult<RagAnswer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Config("Question is empty".to_string()));
        }

        let generator = self.generator.clone().ok_or_else(|| {
            AppError::Config("No generation client configured for this session".to_string())
        })?;

        let retrieval = self.retrieve(question).await?;
        if retrieval.is_empty() {
            tracing::warn!("No context retrieved; run 'ragpilot ingest-best' or 'ragpilot ingest-code' first");
        }

        let prompt = build_prompt(question, &retrieval.best_practices, &retrieval.code)?;
        let answer = generate_answer(generator.client.as_ref(), &generator.model, &prompt).await?;

        Ok(RagAnswer::new(question, answer, &retrieval))
    }

    /// Delete both persisted corpora and clear memory. Idempotent.
    pub fn reset(&mut self) -> AppResult<()> {
        for corpus in Corpus::ALL {
            let dir = corpus_dir(&self.workspace, corpus);
            if dir.exists() {
                std::fs::remove_dir_all(&dir).map_err(|e| {
                    AppError::Knowledge(format!("Failed to remove {:?}: {}", dir, e))
                })?;
                tracing::info!("Removed corpus '{}' at {:?}", corpus, dir);
            }
            match self.slot(corpus) {
                Some(index) => index.reset(),
                slot => *slot = Some(CorpusIndex::new(corpus)),
            }
        }
        Ok(())
    }

    /// Statistics for both corpora, best-practices first.
    pub fn stats(&mut self) -> AppResult<Vec<CorpusStats>> {
        let mut stats = Vec::with_capacity(Corpus::ALL.len());
        for corpus in Corpus::ALL {
            let dir = corpus_dir(&self.workspace, corpus);
            stats.push(self.corpus(corpus)?.stats(&dir));
        }
        Ok(stats)
    }
}
