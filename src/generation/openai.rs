//! OpenAI-compatible chat completions provider.
//!
//! Calls `POST {url}/v1/chat/completions` with a strict `json_schema`
//! response format. Requires `OPENAI_API_KEY` in the environment. Web search
//! grounding is not requested from this provider.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{provider_error, trim_trailing_slash, GenerationClient};
use crate::config::GenerationConfig;
use flashlearn_core::schema::parse_output;
use flashlearn_core::{Generated, GenerationKind};

const DEFAULT_URL: &str = "https://api.openai.com";

pub struct OpenAIClient {
    http: reqwest::Client,
    url: String,
    model: String,
    api_key: String,
}

impl OpenAIClient {
    /// Create an OpenAI client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `OPENAI_API_KEY` is not in the environment.
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;

        Ok(Self {
            http: reqwest::Client::new(),
            url: trim_trailing_slash(config.url.as_deref().unwrap_or(DEFAULT_URL)),
            model: config.model_or_default().to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl GenerationClient for OpenAIClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, kind: GenerationKind, topic: &str) -> Result<Generated> {
        let body = request_body(&self.model, kind, topic);

        tracing::debug!(%kind, model = %self.model, "sending OpenAI request");

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("OpenAI request to {} failed", self.url))?;

        if !response.status().is_success() {
            return Err(provider_error("OpenAI", response).await);
        }

        let json: Value = response.json().await?;
        let text = response_text(&json)?;
        parse_output(kind, &text)
    }
}

pub(crate) fn request_body(model: &str, kind: GenerationKind, topic: &str) -> Value {
    json!({
        "model": model,
        "messages": [{ "role": "user", "content": kind.render_prompt(topic) }],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": kind.operation().schema_name,
                "strict": true,
                "schema": kind.output_schema()
            }
        }
    })
}

pub(crate) fn response_text(json: &Value) -> Result<String> {
    let message = json
        .pointer("/choices/0/message")
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing choices[0].message"))?;

    if let Some(refusal) = message.get("refusal").and_then(|r| r.as_str()) {
        bail!("OpenAI refused the request: {}", refusal);
    }

    message
        .get("content")
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing message content"))
}
