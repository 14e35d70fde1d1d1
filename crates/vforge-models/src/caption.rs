//! Caption segment and word timestamp models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A transcribed word with its timing, as returned by the transcription
/// service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WordTimestamp {
    /// The word as spoken, including any trailing punctuation
    pub word: String,
    /// Start time in seconds
    pub start_time: f64,
    /// End time in seconds
    pub end_time: f64,
    /// Transcription confidence (0.0-1.0), when the service reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl WordTimestamp {
    /// Create a word timestamp without a confidence score.
    pub fn new(word: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            word: word.into(),
            start_time,
            end_time,
            confidence: None,
        }
    }
}

/// A time-bounded caption shown on screen.
///
/// Segments are ordered and never overlap. When derived from word
/// timestamps the `words` list is carried along so downstream styling
/// (karaoke highlighting) can reuse the per-word timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CaptionSegment {
    /// Display text
    pub text: String,
    /// Start time in seconds
    pub start_time: f64,
    /// End time in seconds
    pub end_time: f64,
    /// Word-level timing, present on the accurate (timestamped) path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<WordTimestamp>>,
}

impl CaptionSegment {
    /// Segment duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_duration() {
        let segment = CaptionSegment {
            text: "Hello world".into(),
            start_time: 1.0,
            end_time: 2.5,
            words: None,
        };
        assert!((segment.duration() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_word_serialization_skips_missing_confidence() {
        let word = WordTimestamp::new("Hello", 0.0, 0.3);
        let json = serde_json::to_value(&word).unwrap();
        assert!(json.get("confidence").is_none());
    }
}
