pub mod disk;
pub mod memory;

use crate::core::cache::KeyValueStore;
use anyhow::Result;
use disk::DiskStore;
use memory::MemoryStore;
use std::path::Path;
use std::sync::Arc;

/// Opens the store backing a run: on disk under `data_path`, or in memory
/// when `ephemeral` is set.
pub fn open_store(data_path: &Path, ephemeral: bool) -> Result<Arc<dyn KeyValueStore>> {
    if ephemeral {
        return Ok(Arc::new(MemoryStore::new()));
    }
    let store = DiskStore::open(&data_path.join("store"))?;
    Ok(Arc::new(store))
}
