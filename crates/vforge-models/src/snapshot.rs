//! Queue snapshot blob for persistence.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::job::JobRecord;

/// Current snapshot schema version.
///
/// Loaders discard snapshots with an unknown version rather than
/// misinterpret them.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serialized state of the render queue, written after every mutation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QueueSnapshot {
    /// Schema version
    pub version: u32,
    /// When the snapshot was taken
    pub saved_at: DateTime<Utc>,
    /// All job records, in enqueue order
    pub jobs: Vec<JobRecord>,
}

impl QueueSnapshot {
    /// Snapshot the given records at the current version.
    pub fn new(jobs: Vec<JobRecord>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            jobs,
        }
    }

    /// Check whether this snapshot was written by a compatible schema.
    pub fn is_compatible(&self) -> bool {
        self.version == SNAPSHOT_VERSION
    }
}
