//! Timeline allocation.
//!
//! Converts an ordered list of visual assets into a gapless slot
//! sequence covering the voiceover duration exactly. Re-running with a
//! changed asset list recomputes the whole sequence from scratch; there
//! is no incremental path.

use vforge_models::TimelineSlot;

use crate::error::{TimelineError, TimelineResult};

/// Smallest duration a slot may be allocated.
pub const MIN_SLOT_SECS: f64 = 1.0;

/// Native durations within this distance of the slot duration need
/// neither looping nor trimming.
pub const DURATION_EPSILON: f64 = 0.05;

/// An asset as seen by the allocator: its identity and, when known, its
/// native duration.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetTiming {
    /// Asset identifier, carried into `TimelineSlot::asset_id`
    pub id: String,
    /// Native duration in seconds; `None` for still images
    pub native_duration: Option<f64>,
}

impl AssetTiming {
    /// Asset without a known native duration (generated image).
    pub fn image(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            native_duration: None,
        }
    }

    /// Asset with a known native duration (stock footage).
    pub fn footage(id: impl Into<String>, native_duration: f64) -> Self {
        Self {
            id: id.into(),
            native_duration: Some(native_duration),
        }
    }
}

/// Distribute `total_secs` evenly across `assets`.
///
/// All slots but the last receive `ceil(total / count)` whole seconds;
/// the last slot receives the remainder, floored at [`MIN_SLOT_SECS`].
/// Rounding error is absorbed entirely by the final slot, so the slot
/// sequence covers `[0, total_secs]` exactly.
pub fn allocate_timeline(
    assets: &[AssetTiming],
    total_secs: f64,
) -> TimelineResult<Vec<TimelineSlot>> {
    validate_inputs(assets, total_secs)?;

    let count = assets.len();
    let per_slot = (total_secs / count as f64).ceil();

    let mut durations = vec![per_slot; count];
    let remainder = total_secs - per_slot * (count as f64 - 1.0);
    durations[count - 1] = remainder.max(MIN_SLOT_SECS);

    Ok(build_slots(assets, &durations))
}

/// Lay out caller-supplied per-asset durations (timeline editor path).
///
/// Offsets and loop/trim flags are recomputed; the even-distribution
/// step is skipped. If the supplied durations do not sum to
/// `total_secs`, only the final slot is extended or truncated so the
/// sequence still ends exactly at `total_secs`. Durations that use up
/// the whole target before the final slot begins are rejected.
pub fn allocate_with_durations(
    assets: &[AssetTiming],
    durations: &[f64],
    total_secs: f64,
) -> TimelineResult<Vec<TimelineSlot>> {
    validate_inputs(assets, total_secs)?;

    if durations.len() != assets.len() {
        return Err(TimelineError::DurationCountMismatch {
            assets: assets.len(),
            durations: durations.len(),
        });
    }
    if let Some(bad) = durations.iter().find(|d| **d <= 0.0) {
        return Err(TimelineError::InvalidSlotDuration(*bad));
    }

    let last = durations.len() - 1;
    let allocated_before_last: f64 = durations[..last].iter().sum();
    if allocated_before_last >= total_secs {
        return Err(TimelineError::OverAllocated {
            allocated: allocated_before_last,
            total: total_secs,
        });
    }

    let mut durations = durations.to_vec();
    durations[last] = total_secs - allocated_before_last;

    Ok(build_slots(assets, &durations))
}

fn validate_inputs(assets: &[AssetTiming], total_secs: f64) -> TimelineResult<()> {
    if assets.is_empty() {
        return Err(TimelineError::NoAssets);
    }
    if total_secs <= 0.0 {
        return Err(TimelineError::NonPositiveDuration(total_secs));
    }
    Ok(())
}

/// Materialize slots from a final duration list.
///
/// Each start offset is the sum of the durations before it, computed
/// from the duration list in one place rather than accumulated across
/// calls.
fn build_slots(assets: &[AssetTiming], durations: &[f64]) -> Vec<TimelineSlot> {
    assets
        .iter()
        .zip(durations)
        .enumerate()
        .map(|(i, (asset, &duration))| {
            let start_offset: f64 = durations[..i].iter().sum();
            let (needs_loop, needs_trim) = loop_trim_flags(asset.native_duration, duration);

            TimelineSlot {
                asset_id: asset.id.clone(),
                start_offset,
                end_offset: start_offset + duration,
                target_duration: duration,
                native_duration: asset.native_duration,
                needs_loop,
                needs_trim,
            }
        })
        .collect()
}

fn loop_trim_flags(native: Option<f64>, target: f64) -> (bool, bool) {
    match native {
        Some(native) if (native - target).abs() <= DURATION_EPSILON => (false, false),
        Some(native) => (native < target, native > target),
        None => (false, false),
    }
}
