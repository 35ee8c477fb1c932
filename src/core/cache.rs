//! Key-value persistence seam and the rate table cache built on it

use crate::core::rates::CachedRateTable;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::debug;

pub const RATES_KEY: &str = "fxconv.rates";
pub const SELECTION_KEY: &str = "fxconv.selection";
pub const CONVERTER_KEY: &str = "fxconv.converter";

/// String-valued durable storage.
///
/// Implementations are best-effort: failed reads look like missing keys and
/// failed writes are logged and dropped.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn put(&self, key: &str, value: String);
}

/// Reads and deserializes a JSON value. Absent or corrupt entries yield `None`.
pub async fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key).await?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(key, error = %e, "Ignoring malformed stored value");
            None
        }
    }
}

pub async fn save_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => store.put(key, json).await,
        Err(e) => debug!(key, error = %e, "Failed to serialize value for storage"),
    }
}

/// Persists the most recent rate table.
#[derive(Clone)]
pub struct RateCacheStore {
    store: Arc<dyn KeyValueStore>,
}

impl RateCacheStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> Option<CachedRateTable> {
        let cached = load_json(self.store.as_ref(), RATES_KEY).await;
        if cached.is_some() {
            debug!("Cache HIT for rate table");
        } else {
            debug!("Cache MISS for rate table");
        }
        cached
    }

    pub async fn save(&self, cached: &CachedRateTable) {
        debug!(timestamp = %cached.timestamp, "Cache PUT for rate table");
        save_json(self.store.as_ref(), RATES_KEY, cached).await;
    }
}
