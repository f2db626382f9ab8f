//! Gemini embedding provider.
//!
//! Uses `:embedContent` for a single text and `:batchEmbedContents` for
//! several. The two endpoints answer with different JSON shapes; both are
//! decoded through [`EmbeddingResponse`].

use crate::embeddings::config::EmbeddingConfig;
use crate::embeddings::provider::EmbeddingProvider;
use crate::embeddings::response::EmbeddingResponse;
use ragpilot_core::{AppError, AppResult};
use ragpilot_llm::providers::gemini::{model_resource, API_KEY_HEADER, DEFAULT_GEMINI_URL};
use serde::Serialize;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
struct TextContent {
    parts: Vec<TextPart>,
}

#[derive(Debug, Clone, Serialize)]
struct EmbedContentRequest {
    model: String,
    content: TextContent,
}

#[derive(Debug, Clone, Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedContentRequest>,
}

/// Embedding provider backed by the Generative Language API.
#[derive(Debug, Clone)]
pub struct GeminiEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig, api_key: &str) -> Self {
        let base_url = config
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_GEMINI_URL)
            .trim_end_matches('/')
            .to_string();

        Self {
            client: reqwest::Client::new(),
            base_url,
            model: config.model.clone(),
            api_key: api_key.to_string(),
        }
    }

    /// Fully qualified model resource name.
    fn model_resource(&self) -> String {
        model_resource(&self.model)
    }

    fn endpoint_url(&self, method: &str) -> String {
        format!("{}/v1beta/{}:{}", self.base_url, self.model_resource(), method)
    }

    fn content_request(&self, text: &str) -> EmbedContentRequest {
        EmbedContentRequest {
            model: self.model_resource(),
            content: TextContent {
                parts: vec![TextPart {
                    text: text.to_string(),
                }],
            },
        }
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> AppResult<serde_json::Value> {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send embedding request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Gemini embedding API error ({}): {}",
                status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            AppError::MalformedEmbeddingResponse(format!("response body is not JSON: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = if texts.len() == 1 {
            self.post_json(&self.endpoint_url("embedContent"), &self.content_request(&texts[0]))
                .await?
        } else {
            let request = BatchEmbedRequest {
                requests: texts.iter().map(|t| self.content_request(t)).collect(),
            };
            self.post_json(&self.endpoint_url("batchEmbedContents"), &request)
                .await?
        };

        let vectors = EmbeddingResponse::from_json(body)?.into_vectors(texts.len())?;
        debug!("Received {} embeddings from Gemini", vectors.len());
        Ok(vectors)
    }
}
