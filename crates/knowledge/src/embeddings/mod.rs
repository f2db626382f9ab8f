//! Embedding adapter.
//!
//! Wraps an [`EmbeddingProvider`] and guarantees that every vector handed to
//! the index is unit length and that a batch never mixes dimensions.

pub mod config;
pub mod provider;
pub mod providers;
pub mod response;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};

use ragpilot_core::{AppError, AppResult};
use std::sync::Arc;

/// Guard added to the norm before dividing.
pub const NORM_EPSILON: f32 = 1e-12;

/// Scale `vector` to unit L2 norm in place.
///
/// A zero-norm vector has no direction and is rejected.
pub fn normalize(vector: &mut [f32]) -> AppResult<()> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if !norm.is_finite() || norm == 0.0 {
        return Err(AppError::MalformedEmbeddingResponse(
            "vector has zero norm".to_string(),
        ));
    }
    let scale = norm + NORM_EPSILON;
    for v in vector.iter_mut() {
        *v /= scale;
    }
    Ok(())
}

/// Batched, normalizing front end to an embedding provider.
#[derive(Debug, Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl Embedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, batch_size: usize) -> Self {
        Self {
            provider,
            batch_size: batch_size.max(1),
        }
    }

    /// Build the provider described by `config`.
    pub fn from_config(config: &EmbeddingConfig, api_key: Option<&str>) -> AppResult<Self> {
        let provider = create_provider(config, api_key)?;
        Ok(Self::new(provider, config.batch_size))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Embed texts in provider-sized batches.
    ///
    /// Returns one unit vector per text, in input order, all of the same
    /// dimension.
    pub async fn embed_texts(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::info!(
            "Embedding {} texts using provider '{}' (model: {})",
            texts.len(),
            self.provider.provider_name(),
            self.provider.model_name()
        );

        let batches = texts.len().div_ceil(self.batch_size);
        let mut vectors = Vec::with_capacity(texts.len());
        for (i, batch) in texts.chunks(self.batch_size).enumerate() {
            tracing::debug!("Embedding batch {}/{} ({} texts)", i + 1, batches, batch.len());
            let embedded = self.provider.embed_batch(batch).await?;
            if embedded.len() != batch.len() {
                return Err(AppError::MalformedEmbeddingResponse(format!(
                    "expected {} vectors, got {}",
                    batch.len(),
                    embedded.len()
                )));
            }
            vectors.extend(embedded);
        }

        let dimension = vectors[0].len();
        for vector in vectors.iter_mut() {
            if vector.len() != dimension {
                return Err(AppError::MalformedEmbeddingResponse(format!(
                    "inconsistent vector dimensions in one request: {} and {}",
                    dimension,
                    vector.len()
                )));
            }
            normalize(vector)?;
        }

        tracing::debug!(
            "Generated {} embeddings of dimension {}",
            vectors.len(),
            dimension
        );

        Ok(vectors)
    }

    /// Embed a single query string.
    pub async fn embed_query(&self, query: &str) -> AppResult<Vec<f32>> {
        let mut vectors = self.embed_texts(&[query.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            AppError::MalformedEmbeddingResponse("no vector returned for query".to_string())
        })
    }
}
