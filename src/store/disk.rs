use crate::core::cache::KeyValueStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "kv";

/// Durable store backed by a fjall keyspace
pub struct DiskStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create store directory: {}", path.display()))?;

        let keyspace = Config::new(path)
            .open()
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open store partition")?;
        debug!("Opened disk store at {}", path.display());

        Ok(Self {
            keyspace,
            partition,
        })
    }
}

#[async_trait]
impl KeyValueStore for DiskStore {
    async fn get(&self, key: &str) -> Option<String> {
        let res: Result<Option<String>> = (|| {
            let Some(raw) = self.partition.get(key.as_bytes())? else {
                debug!("Store MISS for key: {}", key);
                return Ok(None);
            };
            debug!("Store HIT for key: {}", key);
            Ok(Some(String::from_utf8(raw.to_vec())?))
        })();

        match res {
            Ok(value) => value,
            Err(e) => {
                debug!("DiskStore get error: {}", e);
                None
            }
        }
    }

    async fn put(&self, key: &str, value: String) {
        let res: Result<()> = (|| {
            self.partition.insert(key.as_bytes(), value.as_bytes())?;
            self.keyspace.persist(PersistMode::SyncAll)?;
            debug!("Store PUT for key: {}", key);
            Ok(())
        })();
        if let Err(e) = res {
            debug!("DiskStore put error: {}", e);
        }
    }
}
