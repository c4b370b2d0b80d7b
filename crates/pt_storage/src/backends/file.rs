use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::warn;

use pt_core::{PatchDescriptor, Result, SnapshotStore};

/// Snapshot persisted as pretty-printed JSON at a fixed path.
///
/// Reads treat a missing file and a file that fails to deserialize the same
/// way: as no snapshot. Writes go through a temp file and a rename so a
/// crashed run never leaves a half-written snapshot behind.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[async_trait]
impl SnapshotStore for FileStorage {
    async fn read(&self) -> Result<Option<PatchDescriptor>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&contents) {
            Ok(descriptor) => Ok(Some(descriptor)),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    "corrupt snapshot, treating as absent: {e}"
                );
                Ok(None)
            }
        }
    }

    async fn write(&self, descriptor: &PatchDescriptor) -> Result<()> {
        let json = serde_json::to_string_pretty(descriptor)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, json.as_bytes()).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
