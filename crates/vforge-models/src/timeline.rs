//! Timeline slot model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A contiguous time-bounded placement of one visual asset within the
/// final timeline.
///
/// Slots are produced by the timeline allocator and are contiguous and
/// non-overlapping: each slot's `end_offset` equals the next slot's
/// `start_offset`, and the last slot ends exactly at the requested total
/// duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimelineSlot {
    /// Asset placed in this slot (matches `VisualAsset::id`)
    pub asset_id: String,
    /// Slot start, seconds from the beginning of the video
    pub start_offset: f64,
    /// Slot end, `start_offset + target_duration`
    pub end_offset: f64,
    /// Time the asset must fill
    pub target_duration: f64,
    /// Native asset duration, when known (stock footage)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_duration: Option<f64>,
    /// Asset is shorter than its slot and must be looped
    pub needs_loop: bool,
    /// Asset is longer than its slot and must be trimmed
    pub needs_trim: bool,
}

impl TimelineSlot {
    /// Slot duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end_offset - self.start_offset
    }
}
