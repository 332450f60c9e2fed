//! Google Gemini provider.
//!
//! Calls `POST {url}/v1beta/models/{model}:generateContent`. Requires
//! `GEMINI_API_KEY` (or `GOOGLE_API_KEY`) in the environment.
//!
//! Ungrounded requests use `responseMimeType: application/json` with a
//! `responseSchema`. Grounded requests (flashcards with
//! `search_grounding = true`) attach the `google_search` tool instead; the
//! API does not accept a response schema alongside it, so the schema is
//! appended to the prompt and the reply is validated the same way.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{provider_error, trim_trailing_slash, GenerationClient};
use crate::config::GenerationConfig;
use flashlearn_core::schema::parse_output;
use flashlearn_core::{Generated, GenerationKind};

const DEFAULT_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiClient {
    http: reqwest::Client,
    url: String,
    model: String,
    api_key: String,
    search_grounding: bool,
}

impl GeminiClient {
    /// Create a Gemini client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if neither `GEMINI_API_KEY` nor `GOOGLE_API_KEY` is set.
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY environment variable not set"))?;

        Ok(Self {
            http: reqwest::Client::new(),
            url: trim_trailing_slash(config.url.as_deref().unwrap_or(DEFAULT_URL)),
            model: config.model_or_default().to_string(),
            api_key,
            search_grounding: config.search_grounding,
        })
    }

    fn grounded(&self, kind: GenerationKind) -> bool {
        self.search_grounding && kind.wants_live_information()
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, kind: GenerationKind, topic: &str) -> Result<Generated> {
        let body = request_body(kind, topic, self.grounded(kind));
        let endpoint = format!("{}/v1beta/models/{}:generateContent", self.url, self.model);

        tracing::debug!(%kind, model = %self.model, grounded = self.grounded(kind), "sending Gemini request");

        let response = self
            .http
            .post(&endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Gemini request to {} failed", self.url))?;

        if !response.status().is_success() {
            return Err(provider_error("Gemini", response).await);
        }

        let json: Value = response.json().await?;
        let text = response_text(&json)?;
        parse_output(kind, &text)
    }
}

/// Build the `generateContent` request body.
pub(crate) fn request_body(kind: GenerationKind, topic: &str, grounded: bool) -> Value {
    let prompt = kind.render_prompt(topic);
    let schema = kind.output_schema();

    if grounded {
        let prompt = format!(
            "{}\n\nRespond with only a JSON object that conforms to this JSON Schema:\n{}",
            prompt, schema
        );
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "tools": [{ "google_search": {} }]
        })
    } else {
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": to_gemini_schema(&schema)
            }
        })
    }
}

/// Convert a JSON Schema into Gemini's OpenAPI-subset dialect: upper-case
/// type names and no `additionalProperties`.
pub(crate) fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                match (key.as_str(), value) {
                    ("additionalProperties", _) => {}
                    ("type", Value::String(t)) => {
                        out.insert(key.clone(), Value::String(t.to_uppercase()));
                    }
                    // Property names are user keys, not schema keywords.
                    ("properties", Value::Object(props)) => {
                        let converted = props
                            .iter()
                            .map(|(name, prop)| (name.clone(), to_gemini_schema(prop)))
                            .collect();
                        out.insert(key.clone(), Value::Object(converted));
                    }
                    _ => {
                        out.insert(key.clone(), to_gemini_schema(value));
                    }
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}

/// Extract the concatenated text parts of the first candidate.
pub(crate) fn response_text(json: &Value) -> Result<String> {
    let candidate = match json
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
    {
        Some(candidate) => candidate,
        None => {
            if let Some(reason) = json
                .pointer("/promptFeedback/blockReason")
                .and_then(|r| r.as_str())
            {
                bail!("Gemini blocked the prompt: {}", reason);
            }
            bail!("Invalid Gemini response: missing candidates");
        }
    };

    let parts = candidate
        .pointer("/content/parts")
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            let reason = candidate
                .get("finishReason")
                .and_then(|r| r.as_str())
                .unwrap_or("unknown");
            anyhow::anyhow!("Gemini returned no content (finish reason: {})", reason)
        })?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.trim().is_empty() {
        bail!("Gemini returned an empty response");
    }
    Ok(text)
}
