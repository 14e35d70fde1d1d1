//! Caption segmentation.
//!
//! The accurate path consumes word-level timestamps from the
//! transcription service; the fallback path estimates timing from the
//! raw script when no transcription is available.

use vforge_models::{format_srt_timestamp, CaptionSegment, WordTimestamp};

use crate::error::{TimelineError, TimelineResult};

/// Maximum words accumulated into one caption.
pub const MAX_SEGMENT_WORDS: usize = 5;

/// Maximum characters accumulated into one caption.
pub const MAX_SEGMENT_CHARS: usize = 40;

/// Inter-word silence that forces a caption boundary.
pub const PAUSE_THRESHOLD_SECS: f64 = 0.4;

/// Shortest caption the fallback path will emit.
pub const MIN_CAPTION_SECS: f64 = 1.0;

/// Punctuation that closes a caption when a word ends with it.
const SENTENCE_TERMINALS: [char; 3] = ['.', '!', '?'];

/// Punctuation the fallback path splits the script on.
const CLAUSE_BOUNDARIES: [char; 6] = ['.', '!', '?', ',', ';', ':'];

/// Segment word timestamps into captions.
///
/// Single left-to-right pass: words accumulate into the open caption
/// until it is full ([`MAX_SEGMENT_WORDS`] / [`MAX_SEGMENT_CHARS`]),
/// ends a sentence, or the next word starts after a pause longer than
/// [`PAUSE_THRESHOLD_SECS`]. A caption's bounds are the first and last
/// accumulated words' timestamps, so a pause belongs to neither side.
/// Concatenating the segments' word lists reproduces the input exactly.
pub fn segment_words(words: &[WordTimestamp]) -> TimelineResult<Vec<CaptionSegment>> {
    if words.is_empty() {
        return Err(TimelineError::NoWords);
    }

    let mut segments = Vec::new();
    let mut current: Vec<WordTimestamp> = Vec::new();
    let mut current_text = String::new();

    for word in words {
        if !current.is_empty() && should_close(&current, &current_text, word) {
            segments.push(flush_segment(&mut current, &mut current_text));
        }

        if !current_text.is_empty() {
            current_text.push(' ');
        }
        current_text.push_str(&word.word);
        current.push(word.clone());
    }

    segments.push(flush_segment(&mut current, &mut current_text));
    Ok(segments)
}

fn should_close(current: &[WordTimestamp], text: &str, next: &WordTimestamp) -> bool {
    if current.len() >= MAX_SEGMENT_WORDS {
        return true;
    }
    if text.chars().count() >= MAX_SEGMENT_CHARS {
        return true;
    }
    if text.ends_with(SENTENCE_TERMINALS) {
        return true;
    }
    // last() cannot fail: callers check current is non-empty
    let gap = next.start_time - current.last().map(|w| w.end_time).unwrap_or(0.0);
    gap > PAUSE_THRESHOLD_SECS
}

fn flush_segment(current: &mut Vec<WordTimestamp>, text: &mut String) -> CaptionSegment {
    let words = std::mem::take(current);
    CaptionSegment {
        text: std::mem::take(text),
        start_time: words.first().map(|w| w.start_time).unwrap_or(0.0),
        end_time: words.last().map(|w| w.end_time).unwrap_or(0.0),
        words: Some(words),
    }
}

/// Estimate captions from the raw script when no timestamps exist.
///
/// The script is split at clause punctuation; each fragment receives a
/// share of `total_secs` proportional to its character count, floored
/// at [`MIN_CAPTION_SECS`]. Fragments are laid back-to-back from zero,
/// so the floor can push the final end time past `total_secs`; with no
/// ground truth available this imprecision is accepted, not corrected.
pub fn segment_script(script: &str, total_secs: f64) -> TimelineResult<Vec<CaptionSegment>> {
    if script.trim().is_empty() {
        return Err(TimelineError::EmptyScript);
    }
    if total_secs <= 0.0 {
        return Err(TimelineError::NonPositiveDuration(total_secs));
    }

    let fragments = split_clauses(script);
    let total_chars: usize = fragments.iter().map(|f| f.chars().count()).sum();

    let mut segments = Vec::with_capacity(fragments.len());
    let mut cursor = 0.0;

    for fragment in fragments {
        let share = fragment.chars().count() as f64 / total_chars as f64;
        let duration = (total_secs * share).max(MIN_CAPTION_SECS);

        segments.push(CaptionSegment {
            text: fragment,
            start_time: cursor,
            end_time: cursor + duration,
            words: None,
        });
        cursor += duration;
    }

    Ok(segments)
}

/// Split the script at clause boundaries, keeping the punctuation with
/// its fragment and dropping empty fragments.
fn split_clauses(script: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut buffer = String::new();

    for ch in script.chars() {
        buffer.push(ch);
        if CLAUSE_BOUNDARIES.contains(&ch) {
            push_fragment(&mut fragments, &mut buffer);
        }
    }
    push_fragment(&mut fragments, &mut buffer);

    fragments
}

fn push_fragment(fragments: &mut Vec<String>, buffer: &mut String) {
    let fragment = std::mem::take(buffer);
    let trimmed = fragment.trim();
    if !trimmed.is_empty() {
        fragments.push(trimmed.to_string());
    }
}

/// Render segments as a SubRip (.srt) document.
pub fn to_srt(segments: &[CaptionSegment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_srt_timestamp(segment.start_time),
            format_srt_timestamp(segment.end_time),
            segment.text
        ));
    }
    out
}
