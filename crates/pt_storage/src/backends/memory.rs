use async_trait::async_trait;
use tokio::sync::RwLock;

use pt_core::{PatchDescriptor, Result, SnapshotStore};

/// In-process snapshot holder; tests and a null durability mode.
pub struct MemoryStorage {
    snapshot: RwLock<Option<PatchDescriptor>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(None),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStorage {
    async fn read(&self) -> Result<Option<PatchDescriptor>> {
        Ok(self.snapshot.read().await.clone())
    }

    async fn write(&self, descriptor: &PatchDescriptor) -> Result<()> {
        *self.snapshot.write().await = Some(descriptor.clone());
        Ok(())
    }
}
