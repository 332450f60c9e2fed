//! Local Ollama provider.
//!
//! Calls `POST {url}/api/chat` (default `http://localhost:11434`) with the
//! output schema as the `format` constraint. No API key is needed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{provider_error, trim_trailing_slash, GenerationClient};
use crate::config::GenerationConfig;
use flashlearn_core::schema::parse_output;
use flashlearn_core::{Generated, GenerationKind};

const DEFAULT_URL: &str = "http://localhost:11434";

pub struct OllamaClient {
    http: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            url: trim_trailing_slash(config.url.as_deref().unwrap_or(DEFAULT_URL)),
            model: config.model_or_default().to_string(),
        })
    }
}

#[async_trait]
impl GenerationClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, kind: GenerationKind, topic: &str) -> Result<Generated> {
        let body = request_body(&self.model, kind, topic);

        tracing::debug!(%kind, model = %self.model, "sending Ollama request");

        let response = self
            .http
            .post(format!("{}/api/chat", self.url))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Ollama connection error (is Ollama running at {}?)", self.url))?;

        if !response.status().is_success() {
            return Err(provider_error("Ollama", response).await);
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
        "stream": false,
        "format": kind.output_schema()
    })
}

pub(crate) fn response_text(json: &Value) -> Result<String> {
    json.pointer("/message/content")
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Invalid Ollama response: missing message.content"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Serve `reply` with `status` on `/api/chat`, counting requests.
    async fn chat_stub(status: StatusCode, reply: Value) -> (OllamaClient, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/api/chat",
            post(move || {
                let counter = counter.clone();
                let reply = reply.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (status, Json(reply))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = OllamaClient::new(&GenerationConfig {
            provider: "ollama".to_string(),
            url: Some(format!("http://{}/", addr)),
            ..Default::default()
        })
        .unwrap();
        (client, hits)
    }

    fn chat_reply(content: &str) -> Value {
        json!({ "message": { "role": "assistant", "content": content }, "done": true })
    }

    #[tokio::test]
    async fn test_generate_parses_fenced_reply() {
        let content = "```json\n{\"summary\": \"Containers. Images.\"}\n```";
        let (client, hits) = chat_stub(StatusCode::OK, chat_reply(content)).await;

        let generated = client
            .generate(GenerationKind::ShortSummary, "Docker")
            .await
            .unwrap();

        assert_eq!(
            generated.into_short_summary().unwrap().summary,
            "Containers. Images."
        );
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_error_fails_without_retry() {
        let (client, hits) =
            chat_stub(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "boom" })).await;

        assert!(client.generate(GenerationKind::FlashcardWithSearch, "Docker").await.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert!(client.generate(GenerationKind::FlashcardWithSearch, "Docker").await.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reply_not_matching_schema_fails() {
        let content = "```json\n{\"topicName\": \"Docker\", \"summary\": \"Containers.\"}\n```";
        let (client, hits) = chat_stub(StatusCode::OK, chat_reply(content)).await;

        assert!(client.generate(GenerationKind::FlashcardWithSearch, "Docker").await.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_request_disables_streaming() {
        let body = request_body("llama3.1", GenerationKind::FlashcardPlain, "Docker");
        assert_eq!(body["stream"], false);
        assert_eq!(body["format"]["required"][0], "topic");
    }

    #[test]
    fn test_response_text() {
        let json = json!({ "message": { "role": "assistant", "content": "{}" }, "done": true });
        assert_eq!(response_text(&json).unwrap(), "{}");
        assert!(response_text(&json!({ "done": true })).is_err());
    }

    #[test]
    fn test_default_url() {
        let client = OllamaClient::new(&GenerationConfig {
            provider: "ollama".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.url, "http://localhost:11434");
        assert_eq!(client.model_name(), "llama3.1");
    }
}
