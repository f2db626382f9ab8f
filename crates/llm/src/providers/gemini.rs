//! Gemini generation provider.
//!
//! Talks to the Generative Language REST API:
//! `POST {base}/v1beta/models/{model}:generateContent`
//!
//! The assembled prompt already carries its instructions, so requests hold a
//! single user turn and no generation options.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use ragpilot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Public Generative Language API endpoint.
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Resource name for `model`, accepting both `gemini-x` and `models/gemini-x`.
pub fn model_resource(model: &str) -> String {
    let name = model.trim().trim_start_matches("models/");
    format!("models/{}", name)
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub(crate) struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub(crate) struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Gemini `generateContent` request body.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

/// Gemini `generateContent` response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

/// Gemini generation client.
pub struct GeminiClient {
    /// Base URL for the API
    base_url: String,

    /// API key sent with every request
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a client against the public endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_GEMINI_URL, api_key)
    }

    /// Create a client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/{}:generateContent",
            self.base_url,
            model_resource(model)
        )
    }

    /// Convert LlmRequest to the Gemini wire format.
    fn to_gemini_request(&self, request: &LlmRequest) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
        }
    }

    fn convert_response(&self, request: &LlmRequest, response: GenerateResponse) -> LlmResponse {
        let usage = response
            .usage_metadata
            .as_ref()
            .map(|u| LlmUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        LlmResponse {
            content: response.text().trim().to_string(),
            model: response
                .model_version
                .clone()
                .unwrap_or_else(|| request.model.clone()),
            usage,
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for GeminiClient {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!("Sending generation request to Gemini (model: {})", request.model);
        tracing::debug!("Prompt length: {} chars", request.prompt.len());

        let body = self.to_gemini_request(request);

        let response = self
            .client
            .post(self.generate_url(&request.model))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Gemini: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let gemini_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Gemini response: {}", e)))?;

        tracing::info!("Received completion from Gemini");

        Ok(self.convert_response(request, gemini_response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_client_creation() {
        let client = GeminiClient::with_base_url("http://localhost:8080/", "key");
        assert_eq!(client.provider_name(), "gemini");
        assert_eq!(client.base_url, "http://localhost:8080");
        assert_eq!(
            client.generate_url("gemini-2.5-flash"),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_conversion() {
        let client = GeminiClient::new("key");
        let body =
            serde_json::to_value(client.to_gemini_request(&LlmRequest::new("Hello", "m"))).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Hello");
        assert_eq!(body.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_model_prefix_is_not_doubled() {
        let client = GeminiClient::with_base_url("http://localhost:8080", "key");
        assert_eq!(
            client.generate_url("models/gemini-2.5-flash"),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(model_resource(" gemini-2.5-flash "), "models/gemini-2.5-flash");
    }

    #[test]
    fn test_response_conversion() {
        let client = GeminiClient::new("key");
        let raw = serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Use "}, {"text": "logging. "}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3, "totalTokenCount": 15},
            "modelVersion": "gemini-2.5-flash-001"
        });
        let parsed: GenerateResponse = serde_json::from_value(raw).unwrap();
        let response = client.convert_response(&LlmRequest::new("q", "gemini-2.5-flash"), parsed);

        assert_eq!(response.content, "Use logging.");
        assert_eq!(response.model, "gemini-2.5-flash-001");
        assert_eq!(response.usage, LlmUsage::new(12, 3));
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        let client = GeminiClient::new("key");
        let parsed: GenerateResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        let response = client.convert_response(&LlmRequest::new("q", "m"), parsed);
        assert!(response.content.is_empty());
        assert_eq!(response.model, "m");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transient() {
        let client = GeminiClient::with_base_url("http://127.0.0.1:9", "key");
        let err = client
            .complete(&LlmRequest::new("hello", "gemini-2.5-flash"))
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }
}
