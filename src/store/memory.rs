use crate::core::cache::KeyValueStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory store, lost when the process exits
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.inner.lock().await;
        let value = entries.get(key).cloned();
        if value.is_some() {
            debug!("Store HIT for key: {}", key);
        } else {
            debug!("Store MISS for key: {}", key);
        }
        value
    }

    async fn put(&self, key: &str, value: String) {
        let mut entries = self.inner.lock().await;
        debug!("Store PUT for key: {}", key);
        entries.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_get_put() {
        let store = MemoryStore::new();

        // Initially, store is empty
        assert!(store.get("key1").await.is_none());

        store.put("key1", "123".to_string()).await;
        assert_eq!(store.get("key1").await.as_deref(), Some("123"));

        // Overwrite replaces the value
        store.put("key1", "456".to_string()).await;
        assert_eq!(store.get("key1").await.as_deref(), Some("456"));

        assert!(store.get("key2").await.is_none());
    }

    #[tokio::test]
    async fn test_memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.put("key1", "v".to_string()).await;
        assert_eq!(other.get("key1").await.as_deref(), Some("v"));
    }
}
