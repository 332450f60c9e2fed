//! TOML configuration parsing and validation.
//!
//! FlashLearn is configured via a TOML file (default: `config/flashlearn.toml`).
//! Only `[generation]` is required; every other section has defaults.
//!
//! ```toml
//! [generation]
//! provider = "gemini"          # gemini | openai | ollama
//! model = "gemini-2.0-flash"
//! search_grounding = true
//!
//! [session]
//! store_path = "./data/flashlearn.json"
//!
//! [export]
//! dir = "./exports"
//!
//! [server]
//! bind = "127.0.0.1:9002"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub generation: GenerationConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    /// Base URL override for the provider API.
    #[serde(default)]
    pub url: Option<String>,
    /// Attach the provider's web-search tool to flashcard generation
    /// (Gemini only).
    #[serde(default = "default_search_grounding")]
    pub search_grounding: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            url: None,
            search_grounding: default_search_grounding(),
        }
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_search_grounding() -> bool {
    true
}

impl GenerationConfig {
    /// Model name, falling back to the provider's default.
    pub fn model_or_default(&self) -> &str {
        if let Some(model) = self.model.as_deref() {
            return model;
        }
        match self.provider.as_str() {
            "openai" => "gpt-4o-mini",
            "ollama" => "llama3.1",
            _ => "gemini-2.0-flash",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./data/flashlearn.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
        }
    }
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("./exports")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:9002".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&content)?;
    validate(&config)?;
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).with_context(|| "Failed to parse config file")
}

fn validate(config: &Config) -> Result<()> {
    match config.generation.provider.as_str() {
        "gemini" | "openai" | "ollama" => {}
        other => anyhow::bail!(
            "Unknown generation provider: '{}'. Must be gemini, openai, or ollama.",
            other
        ),
    }

    if let Some(model) = &config.generation.model {
        if model.trim().is_empty() {
            anyhow::bail!("generation.model must not be empty");
        }
    }

    if let Some(url) = &config.generation.url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("generation.url must start with http:// or https://");
        }
    }

    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    Ok(())
}
