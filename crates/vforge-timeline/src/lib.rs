//! Pure timing computation for the VidForge render pipeline.
//!
//! This crate provides:
//! - Timeline allocation: visual assets + a target duration into a
//!   gapless slot sequence with loop/trim decisions
//! - Caption segmentation: word timestamps (or raw script text) into
//!   time-bounded caption segments
//!
//! Both are deterministic, synchronous functions with no I/O; callers
//! run them before enqueueing a render job and freeze the results into
//! the request snapshot.

pub mod allocator;
pub mod captions;
pub mod error;

pub use allocator::{allocate_timeline, allocate_with_durations, AssetTiming};
pub use captions::{segment_script, segment_words, to_srt};
pub use error::{TimelineError, TimelineResult};
