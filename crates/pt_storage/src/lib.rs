use std::path::Path;
use std::sync::Arc;

use pt_core::{Error, Result, SnapshotStore};

pub mod backends;

pub use backends::{FileStorage, MemoryStorage};

/// Resolves a snapshot backend by name.
pub fn create_storage(kind: &str, path: &Path) -> Result<Arc<dyn SnapshotStore>> {
    match kind {
        "file" => Ok(Arc::new(FileStorage::new(path))),
        "memory" => Ok(Arc::new(MemoryStorage::new())),
        other => Err(Error::Storage(format!("unknown storage backend: {other}"))),
    }
}
