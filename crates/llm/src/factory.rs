//! Generation provider factory.
//!
//! Resolves a provider name to a concrete client, refusing to build one
//! when a required credential is missing.

use crate::client::LlmClient;
use crate::providers::gemini::{GeminiClient, DEFAULT_GEMINI_URL};
use crate::types::ProviderType;
use ragpilot_core::{AppError, AppResult};
use std::sync::Arc;

/// Create a generation client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("gemini")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required by remote providers)
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or its
/// credential is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    let api_key = match api_key {
        Some(key) if !key.trim().is_empty() => Some(key),
        _ if provider_type.requires_api_key() => {
            return Err(AppError::Config(format!(
                "{} provider requires an API key",
                provider_type.as_str()
            )));
        }
        _ => None,
    };

    match provider_type {
        ProviderType::Gemini => {
            let base_url = endpoint.unwrap_or(DEFAULT_GEMINI_URL);
            let client = GeminiClient::with_base_url(base_url, api_key.unwrap_or_default());
            tracing::debug!("Created Gemini client for {}", base_url);
            Ok(Arc::new(client))
        }
    }
}
