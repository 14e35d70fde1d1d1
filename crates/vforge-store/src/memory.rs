//! In-memory snapshot store for tests and in-process embedding.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use vforge_models::QueueSnapshot;

use crate::error::StoreResult;
use crate::store::SnapshotStore;

/// Snapshot store that keeps the last snapshot in memory.
#[derive(Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<QueueSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the store, e.g. to test restart recovery.
    pub fn with_snapshot(snapshot: QueueSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
        }
    }

    /// Number of jobs in the held snapshot, if any.
    pub fn job_count(&self) -> Option<usize> {
        self.lock().as_ref().map(|s| s.jobs.len())
    }

    fn lock(&self) -> MutexGuard<'_, Option<QueueSnapshot>> {
        match self.snapshot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn save(&self, snapshot: &QueueSnapshot) -> StoreResult<()> {
        *self.lock() = Some(snapshot.clone());
        Ok(())
    }

    async fn load(&self) -> StoreResult<Option<QueueSnapshot>> {
        Ok(self.lock().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load().await.unwrap().is_none());

        store.save(&QueueSnapshot::new(Vec::new())).await.unwrap();
        assert!(store.load().await.unwrap().is_some());
        assert_eq!(store.job_count(), Some(0));
    }

    #[tokio::test]
    async fn test_with_snapshot_preseeds_state() {
        let store = MemoryStore::with_snapshot(QueueSnapshot::new(Vec::new()));
        assert!(store.load().await.unwrap().is_some());
    }
}
