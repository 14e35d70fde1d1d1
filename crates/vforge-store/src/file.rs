//! JSON file snapshot store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use vforge_models::QueueSnapshot;

use crate::error::StoreResult;
use crate::store::SnapshotStore;

/// Snapshot store backed by a single JSON file.
///
/// Writes go to a sibling temp file first and are renamed into place,
/// so a crash mid-write leaves the previous snapshot intact.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store writing to `path`. Parent directories are
    /// created on the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn save(&self, snapshot: &QueueSnapshot) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let payload = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &payload).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = ?self.path, jobs = snapshot.jobs.len(), "Saved queue snapshot");
        Ok(())
    }

    async fn load(&self) -> StoreResult<Option<QueueSnapshot>> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "No queue snapshot found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: QueueSnapshot = match serde_json::from_slice(&data) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Discarding unreadable queue snapshot");
                return Ok(None);
            }
        };

        if !snapshot.is_compatible() {
            warn!(
                path = ?self.path,
                version = snapshot.version,
                "Discarding queue snapshot with incompatible version"
            );
            return Ok(None);
        }

        Ok(Some(snapshot))
    }
}
