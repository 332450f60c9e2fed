//! Generation client abstraction and provider implementations.
//!
//! Defines the [`GenerationClient`] trait and concrete HTTP providers:
//! - **[`GeminiClient`]**: Google Gemini `generateContent` with a response
//!   schema, optionally grounded with Google Search for flashcards.
//! - **[`OpenAIClient`]**: OpenAI-compatible chat completions with a strict
//!   `json_schema` response format.
//! - **[`OllamaClient`]**: a local Ollama instance's `/api/chat` with a
//!   `format` schema.
//!
//! # Contract
//!
//! Every call renders the kind's prompt template, submits it together with
//! the kind's output schema, and awaits exactly one response. There is no
//! retry loop and no client-side timeout. Provider errors, transport
//! errors, malformed payloads and schema violations all surface as a single
//! opaque [`anyhow::Error`]; callers do not discriminate between them.
//!
//! # Provider Selection
//!
//! Use [`create_client`] once at startup and share the returned
//! `Arc<dyn GenerationClient>`:
//!
//! ```rust,no_run
//! # use flashlearn::config::GenerationConfig;
//! # use flashlearn::generation::create_client;
//! let config = GenerationConfig::default(); // provider = "gemini"
//! let client = create_client(&config).unwrap(); // needs GEMINI_API_KEY
//! assert_eq!(client.provider_name(), "gemini");
//! ```

mod gemini;
mod ollama;
mod openai;

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use openai::OpenAIClient;

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::GenerationConfig;
use flashlearn_core::{Generated, GenerationKind};

/// A structured-output generation backend.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Provider identifier (e.g. `"gemini"`).
    fn provider_name(&self) -> &str;

    /// Model identifier (e.g. `"gemini-2.0-flash"`).
    fn model_name(&self) -> &str;

    /// Generate the structured output for `kind` about `topic`.
    ///
    /// `topic` has already been validated by the caller.
    async fn generate(&self, kind: GenerationKind, topic: &str) -> Result<Generated>;
}

/// Create the [`GenerationClient`] selected by configuration.
///
/// | Config Value | Client |
/// |-------------|--------|
/// | `"gemini"` | [`GeminiClient`] |
/// | `"openai"` | [`OpenAIClient`] |
/// | `"ollama"` | [`OllamaClient`] |
///
/// # Errors
///
/// Returns an error for unknown provider names or when the provider's API
/// key is missing from the environment.
pub fn create_client(config: &GenerationConfig) -> Result<Arc<dyn GenerationClient>> {
    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiClient::new(config)?)),
        "openai" => Ok(Arc::new(OpenAIClient::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaClient::new(config)?)),
        other => bail!("Unknown generation provider: {}", other),
    }
}

/// Read the body of a non-success response into an error.
async fn provider_error(provider: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let body_text = response.text().await.unwrap_or_default();
    anyhow::anyhow!("{} API error {}: {}", provider, status, body_text)
}

fn trim_trailing_slash(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
