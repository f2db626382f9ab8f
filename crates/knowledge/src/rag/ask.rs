//! Answer generation.
//!
//! Sends the assembled prompt to the generation client and returns its text.
//! Errors from the service propagate unchanged; nothing is retried.

use ragpilot_core::AppResult;
use ragpilot_llm::{LlmClient, LlmRequest};

/// Returned when the model answers with no text.
pub const EMPTY_ANSWER: &str = "(no answer text)";

/// Generate an answer for an already assembled prompt.
pub async fn generate_answer(client: &dyn LlmClient, model: &str, prompt: &str) -> AppResult<String> {
    tracing::debug!(
        "Generating answer with provider '{}' (model: {}, prompt: {} chars)",
        client.provider_name(),
        model,
        prompt.chars().count()
    );

    let request = LlmRequest::new(prompt, model);
    let response = client.complete(&request).await?;

    tracing::debug!(
        "Generation used {} prompt and {} completion tokens",
        response.usage.prompt_tokens,
        response.usage.completion_tokens
    );

    let answer = response.content.trim();
    if answer.is_empty() {
        tracing::warn!("Model returned an empty answer");
        return Ok(EMPTY_ANSWER.to_string());
    }

    Ok(answer.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragpilot_core::AppError;
    use ragpilot_llm::{LlmResponse, LlmUsage};
    use std::sync::Mutex;

    struct CannedClient {
        reply: Result<String, String>,
        seen: Mutex<Vec<LlmRequest>>,
    }

    impl CannedClient {
        fn new(reply: Result<&str, &str>) -> Self {
            Self {
                reply: reply.map(str::to_string).map_err(str::to_string),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for CannedClient {
        fn provider_name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(content) => Ok(LlmResponse {
                    content: content.clone(),
                    model: request.model.clone(),
                    usage: LlmUsage::new(1, 1),
                }),
                Err(message) => Err(AppError::Llm(message.clone())),
            }
        }
    }

    #[tokio::test]
    async fn test_answer_is_trimmed() {
        let client = CannedClient::new(Ok("  It does.\n"));
        let answer = generate_answer(&client, "gemini-2.5-flash", "prompt").await.unwrap();
        assert_eq!(answer, "It does.");

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen[0].prompt, "prompt");
        assert_eq!(seen[0].model, "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn test_empty_answer_fallback() {
        let client = CannedClient::new(Ok("   "));
        let answer = generate_answer(&client, "m", "prompt").await.unwrap();
        assert_eq!(answer, EMPTY_ANSWER);
    }

    #[tokio::test]
    async fn test_service_error_propagates() {
        let client = CannedClient::new(Err("HTTP 503"));
        let err = generate_answer(&client, "m", "prompt").await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(client.seen.lock().unwrap().len(), 1);
    }
}
