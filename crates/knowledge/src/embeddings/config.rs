//! Embedding provider configuration.

use ragpilot_core::{AppConfig, AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Settings needed to build an embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "gemini" or "mock"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Custom API endpoint
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Maximum texts per request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Vector size produced by the mock provider
    #[serde(default = "default_mock_dimensions")]
    pub mock_dimensions: usize,
}

fn default_batch_size() -> usize {
    100
}

fn default_mock_dimensions() -> usize {
    384
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: ragpilot_core::config::DEFAULT_EMBED_MODEL.to_string(),
            endpoint: None,
            batch_size: default_batch_size(),
            mock_dimensions: default_mock_dimensions(),
        }
    }
}

impl EmbeddingConfig {
    /// Offline provider producing deterministic vectors.
    pub fn mock() -> Self {
        Self {
            provider: "mock".to_string(),
            model: "trigram-v1".to_string(),
            ..Default::default()
        }
    }

    /// Derive embedding settings from the application config.
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            provider: config.embedding_provider.clone(),
            model: config.embedding_model.clone(),
            endpoint: config.endpoint.clone(),
            batch_size: config.knowledge.embed_batch_size,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.batch_size == 0 {
            return Err(AppError::Config(
                "Embedding batch size must be greater than 0".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(AppError::Config("Embedding model is empty".to_string()));
        }
        Ok(())
    }
}
