//! Shared data models for the VidForge backend.
//!
//! This crate provides Serde-serializable types for:
//! - Render jobs and their lifecycle
//! - Render requests (the wizard's flow variants)
//! - Timeline slots and caption segments
//! - Timecode parsing/formatting
//! - Queue snapshots for persistence

pub mod caption;
pub mod job;
pub mod request;
pub mod snapshot;
pub mod timecode;
pub mod timeline;

// Re-export common types
pub use caption::{CaptionSegment, WordTimestamp};
pub use job::{JobId, JobRecord, JobStatus, RenderHandle};
pub use request::{AspectRatio, AudioTrack, AssetKind, Overlay, RenderRequest, VisualAsset};
pub use snapshot::{QueueSnapshot, SNAPSHOT_VERSION};
pub use timecode::{format_seconds, format_srt_timestamp, parse_timecode, TimecodeError};
pub use timeline::TimelineSlot;
