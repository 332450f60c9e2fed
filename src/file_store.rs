//! JSON-file [`KeyValueStore`] backend.
//!
//! All keys live in one JSON object on disk:
//!
//! ```json
//! { "recentTopics": "[\"Rust\",\"Docker\"]" }
//! ```
//!
//! Every save rewrites the whole file through a sibling temp file and a
//! rename, so readers never observe a half-written document. A missing file
//! reads as an empty store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

use flashlearn_core::store::KeyValueStore;

pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse store file: {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read store file: {}", self.path.display())),
        }
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let mut values = self.read_all().await?;
        Ok(values.remove(key))
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        // A corrupt file is replaced rather than blocking every future save.
        let mut values = match self.read_all().await {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!("Discarding unreadable store file: {:#}", e);
                BTreeMap::new()
            }
        };
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create store directory: {}", parent.display())
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&values)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write store file: {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace store file: {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashlearn_core::store::{load_json, save_json, RECENT_TOPICS_KEY};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path().join("none.json"));
        assert_eq!(store.load(RECENT_TOPICS_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_creates_parent_and_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/flashlearn.json");
        let store = JsonFileStore::new(&path);

        save_json(&store, RECENT_TOPICS_KEY, &vec!["Rust", "Docker"])
            .await
            .unwrap();

        let reopened = JsonFileStore::new(&path);
        let topics: Option<Vec<String>> = load_json(&reopened, RECENT_TOPICS_KEY).await.unwrap();
        assert_eq!(topics, Some(vec!["Rust".to_string(), "Docker".to_string()]));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path().join("kv.json"));
        store.save("a", "1").await.unwrap();
        store.save("b", "2").await.unwrap();
        store.save("a", "3").await.unwrap();
        assert_eq!(store.load("a").await.unwrap().as_deref(), Some("3"));
        assert_eq!(store.load("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_corrupt_file_fails_load_but_not_save() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("kv.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(&path);

        assert!(store.load("a").await.is_err());
        store.save("a", "1").await.unwrap();
        assert_eq!(store.load("a").await.unwrap().as_deref(), Some("1"));
    }
}
