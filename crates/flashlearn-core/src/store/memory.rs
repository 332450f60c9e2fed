//! In-memory [`KeyValueStore`] implementation for tests and embedders.
//!
//! Uses a `HashMap` behind `std::sync::RwLock`.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use super::KeyValueStore;

#[derive(Default)]
pub struct InMemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, e.g. to simulate state left by an earlier session.
    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.values
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{load_json, save_json, RECENT_TOPICS_KEY};

    #[tokio::test]
    async fn test_missing_key_loads_none() {
        let store = InMemoryStore::new();
        let loaded: Option<Vec<String>> = load_json(&store, RECENT_TOPICS_KEY).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_whole_value() {
        let store = InMemoryStore::new();
        save_json(&store, RECENT_TOPICS_KEY, &vec!["Rust", "Go"]).await.unwrap();
        save_json(&store, RECENT_TOPICS_KEY, &vec!["Zig"]).await.unwrap();
        let loaded: Option<Vec<String>> = load_json(&store, RECENT_TOPICS_KEY).await.unwrap();
        assert_eq!(loaded, Some(vec!["Zig".to_string()]));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_json_is_an_error() {
        let store = InMemoryStore::new().with_value(RECENT_TOPICS_KEY, "[not json");
        let loaded: Result<Option<Vec<String>>> = load_json(&store, RECENT_TOPICS_KEY).await;
        assert!(loaded.is_err());
    }
}
