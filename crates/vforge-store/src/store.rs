//! Snapshot store contract.

use async_trait::async_trait;

use vforge_models::QueueSnapshot;

use crate::error::StoreResult;

/// Key-value blob persistence for the queue snapshot.
///
/// `load` returns `Ok(None)` for "nothing stored yet"; implementations
/// also degrade corrupt or incompatible payloads to `Ok(None)` rather
/// than failing the caller, since the snapshot is a recovery aid, not
/// a source of truth the queue cannot run without.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persist the snapshot, replacing any previous one.
    async fn save(&self, snapshot: &QueueSnapshot) -> StoreResult<()>;

    /// Load the last persisted snapshot, if any.
    async fn load(&self) -> StoreResult<Option<QueueSnapshot>>;
}
