//! Generation client crate for ragpilot.
//!
//! Provides a provider-agnostic abstraction for sending an assembled prompt
//! to a generative model and getting text back.
//!
//! # Providers
//! - **Gemini**: Google Generative Language REST API (default)
//!
//! # Example
//! ```no_run
//! use ragpilot_llm::{LlmClient, LlmRequest, providers::GeminiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new("my-api-key");
//! let request = LlmRequest::new("Hello, world!", "gemini-2.5-flash");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::GeminiClient;
pub use types::ProviderType;
