use async_trait::async_trait;

use crate::types::PatchDescriptor;
use crate::Result;

/// Durable home of the last published descriptor.
///
/// A missing snapshot and a corrupt one are the same thing to callers:
/// implementations return `Ok(None)` for both rather than surfacing a read
/// error. Writes replace the snapshot wholesale.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read the persisted snapshot, if any.
    async fn read(&self) -> Result<Option<PatchDescriptor>>;

    /// Replace the persisted snapshot with `descriptor`.
    async fn write(&self, descriptor: &PatchDescriptor) -> Result<()>;
}

/// Decides whether a freshly built descriptor supersedes the persisted one.
///
/// Only `title`, `url`, `epoch` and the amendment-date sequence take part in
/// the comparison; the timestamp fields are derived values and a fresh
/// no-amendment `mid_patch_epoch` changes on every run.
pub fn should_persist(new: &PatchDescriptor, existing: Option<&PatchDescriptor>) -> bool {
    match existing {
        None => true,
        Some(old) => {
            new.title != old.title
                || new.url != old.url
                || new.epoch != old.epoch
                || new.mid_patch_update_dates != old.mid_patch_update_dates
        }
    }
}
