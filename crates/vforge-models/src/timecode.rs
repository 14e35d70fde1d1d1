//! Timecode parsing and formatting.
//!
//! Shared timecode handling for voiceover durations and caption export,
//! supporting HH:MM:SS, HH:MM:SS.mmm, MM:SS, and bare-seconds inputs.

use thiserror::Error;

/// Parse a timecode string to total seconds.
///
/// Supports:
/// - `HH:MM:SS` or `HH:MM:SS.mmm`
/// - `MM:SS` or `MM:SS.mmm`
/// - `SS` or `SS.mmm`
///
/// # Examples
/// ```
/// use vforge_models::timecode::parse_timecode;
/// assert_eq!(parse_timecode("01:30:00").unwrap(), 5400.0);
/// assert_eq!(parse_timecode("05:30").unwrap(), 330.0);
/// assert_eq!(parse_timecode("90").unwrap(), 90.0);
/// ```
pub fn parse_timecode(tc: &str) -> Result<f64, TimecodeError> {
    let tc = tc.trim();
    if tc.is_empty() {
        return Err(TimecodeError::Empty);
    }

    let parts: Vec<&str> = tc.split(':').collect();
    let components: Vec<f64> = parts
        .iter()
        .map(|p| {
            p.parse::<f64>()
                .map_err(|_| TimecodeError::InvalidComponent(p.to_string()))
        })
        .collect::<Result<_, _>>()?;

    if components.iter().any(|c| *c < 0.0) {
        return Err(TimecodeError::Negative);
    }

    match components.as_slice() {
        [secs] => Ok(*secs),
        [mins, secs] => Ok(mins * 60.0 + secs),
        [hours, mins, secs] => Ok(hours * 3600.0 + mins * 60.0 + secs),
        _ => Err(TimecodeError::InvalidFormat(tc.to_string())),
    }
}

/// Format seconds as `HH:MM:SS` or `HH:MM:SS.mmm`.
pub fn format_seconds(total_secs: f64) -> String {
    let hours = (total_secs / 3600.0).floor() as u32;
    let mins = ((total_secs % 3600.0) / 60.0).floor() as u32;
    let secs = total_secs % 60.0;

    if (secs - secs.floor()).abs() > 0.0001 {
        format!("{:02}:{:02}:{:06.3}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs.floor() as u32)
    }
}

/// Format seconds as a SubRip cue timestamp, `HH:MM:SS,mmm`.
pub fn format_srt_timestamp(total_secs: f64) -> String {
    let total_millis = (total_secs.max(0.0) * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let mins = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, millis)
}

/// Timecode parsing error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimecodeError {
    #[error("Timecode cannot be empty")]
    Empty,

    #[error("Timecode cannot be negative")]
    Negative,

    #[error("Invalid timecode component: {0}")]
    InvalidComponent(String),

    #[error("Invalid timecode format '{0}'. Use HH:MM:SS, MM:SS, or SS")]
    InvalidFormat(String),
}
