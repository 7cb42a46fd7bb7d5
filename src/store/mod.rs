pub mod disk;
pub mod memory;

use crate::core::store::KeyValueStore;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

pub use disk::DiskStore;
pub use memory::MemoryStore;

/// Opens the disk store under `data_path`, falling back to memory when the
/// keyspace cannot be opened.
pub fn open(data_path: Option<&Path>) -> Arc<dyn KeyValueStore> {
    let Some(path) = data_path else {
        warn!("No data directory available, using in-memory store");
        return Arc::new(MemoryStore::new());
    };

    match DiskStore::open(&path.join("store")) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "Failed to open disk store, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_without_path_uses_memory() {
        let store = open(None);
        store.set("key", "value").unwrap();
        assert_eq!(store.get("key").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_open_with_path_creates_store_dir() {
        let dir = tempdir().unwrap();
        let store = open(Some(dir.path()));
        store.set("key", "value").unwrap();
        assert!(dir.path().join("store").exists());
    }
}
