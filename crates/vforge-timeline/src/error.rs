//! Timing computation error types.

use thiserror::Error;

pub type TimelineResult<T> = Result<T, TimelineError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    #[error("Asset list is empty")]
    NoAssets,

    #[error("Target duration must be positive, got {0}")]
    NonPositiveDuration(f64),

    #[error("Expected {assets} durations to match the asset list, got {durations}")]
    DurationCountMismatch { assets: usize, durations: usize },

    #[error("Slot duration must be positive, got {0}")]
    InvalidSlotDuration(f64),

    #[error("Supplied durations allocate {allocated}s before the final slot, exceeding the {total}s target")]
    OverAllocated { allocated: f64, total: f64 },

    #[error("Word list is empty")]
    NoWords,

    #[error("Script is empty")]
    EmptyScript,
}
