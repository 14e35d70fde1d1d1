//! Headless render queue engine.
//!
//! Restores the persisted render queue and reconciles it against the
//! render backend until it drains or the process is asked to stop. The
//! product UI embeds [`vforge_queue::RenderQueue`] directly; this
//! binary exists to finish renders that were in flight when a session
//! ended.

pub mod config;

pub use config::EngineConfig;
