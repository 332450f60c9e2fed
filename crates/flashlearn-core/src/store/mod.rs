//! Key-value persistence port for session state.
//!
//! The [`KeyValueStore`] trait is the only storage dependency of the
//! session manager. Values are opaque strings; [`load_json`] and
//! [`save_json`] layer typed JSON encoding on top, so backends stay
//! object-safe and medium-agnostic (browser local storage, a JSON file,
//! memory).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Key under which the recent-topics list is persisted.
pub const RECENT_TOPICS_KEY: &str = "recentTopics";

/// Abstract key-value backend.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`load`](KeyValueStore::load) | Read the value stored under a key, if any |
/// | [`save`](KeyValueStore::save) | Overwrite the value stored under a key |
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>>;

    async fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// Load and decode a JSON value stored under `key`.
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>> {
    match store.load(key).await? {
        Some(raw) => {
            let value = serde_json::from_str(&raw)
                .with_context(|| format!("Stored value for '{}' is not valid JSON", key))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Encode `value` as JSON and store it under `key`, replacing any previous value.
pub async fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.save(key, &raw).await
}
