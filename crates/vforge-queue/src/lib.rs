//! Client-resident render job queue.
//!
//! This crate provides:
//! - [`RenderQueue`]: an owned scheduler holding job records, enforcing
//!   a concurrency cap, and reconciling against a render backend via
//!   [`RenderQueue::tick`]
//! - Lifecycle events for observers via a broadcast channel
//! - A background runner driving the tick on a fixed interval
//!
//! The scheduler core is driver-agnostic: production runs
//! [`RenderQueue::run`] on a timer, tests call `tick()` directly.

pub mod config;
pub mod error;
pub mod events;
pub mod scheduler;

mod runner;

pub use config::QueueConfig;
pub use error::{QueueError, QueueResult};
pub use events::JobEvent;
pub use scheduler::{QueueCounts, RenderQueue, TickSummary};
