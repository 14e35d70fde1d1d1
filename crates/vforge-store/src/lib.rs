//! Queue snapshot persistence.
//!
//! The render queue saves its state after every mutation and restores
//! it at startup. Persistence is best-effort: a failed save is logged
//! by the caller, never fatal, and a missing or unreadable snapshot
//! loads as empty.

pub mod error;
pub mod file;
pub mod memory;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use store::SnapshotStore;
