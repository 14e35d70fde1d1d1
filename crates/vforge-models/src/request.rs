//! Render request snapshots.
//!
//! A render request is frozen when the job is enqueued: the queue never
//! mutates the business payload, only job lifecycle fields. The wizard's
//! flow types are modeled as a tagged union so building a backend
//! submission is exhaustive at compile time.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::caption::CaptionSegment;
use crate::timeline::TimelineSlot;

/// Output aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    /// 9:16, the wizard's default for short-form output
    #[default]
    Vertical,
    /// 1:1
    Square,
    /// 16:9
    Wide,
}

impl AspectRatio {
    /// Ratio string as sent to the render backend.
    pub fn as_ratio_str(&self) -> &'static str {
        match self {
            AspectRatio::Vertical => "9:16",
            AspectRatio::Square => "1:1",
            AspectRatio::Wide => "16:9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ratio_str())
    }
}

impl FromStr for AspectRatio {
    type Err = AspectRatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "9:16" | "vertical" => Ok(AspectRatio::Vertical),
            "1:1" | "square" => Ok(AspectRatio::Square),
            "16:9" | "wide" => Ok(AspectRatio::Wide),
            _ => Err(AspectRatioParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown aspect ratio: {0}")]
pub struct AspectRatioParseError(String);

/// Kind of visual asset placed on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Generated still image
    Image,
    /// Stock or uploaded footage
    Video,
}

/// A visual asset referenced by a render request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VisualAsset {
    /// Opaque asset identifier (matches `TimelineSlot::asset_id`)
    pub id: String,
    /// Download URL for the render backend
    pub url: String,
    /// Asset kind
    pub kind: AssetKind,
}

/// The voiceover track driving the video's total duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AudioTrack {
    /// Download URL for the render backend
    pub url: String,
    /// Total duration in seconds
    pub duration_secs: f64,
}

/// Static overlay composited on top of the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Overlay {
    /// Corner watermark image
    Watermark {
        url: String,
        /// 0.0 (invisible) to 1.0 (opaque)
        opacity: f32,
    },
    /// Title card text shown at the start
    Title { text: String, duration_secs: f64 },
}

/// Fully-resolved render request, one variant per wizard flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "flow", rename_all = "snake_case")]
pub enum RenderRequest {
    /// One visual asset held for the whole voiceover duration.
    SingleAsset {
        asset: VisualAsset,
        voiceover: AudioTrack,
        captions: Vec<CaptionSegment>,
        #[serde(default)]
        overlays: Vec<Overlay>,
        #[serde(default)]
        aspect: AspectRatio,
    },

    /// Generated images laid out on an allocated timeline.
    MultiAsset {
        timeline: Vec<TimelineSlot>,
        assets: Vec<VisualAsset>,
        voiceover: AudioTrack,
        captions: Vec<CaptionSegment>,
        #[serde(default)]
        overlays: Vec<Overlay>,
        #[serde(default)]
        aspect: AspectRatio,
    },

    /// Stock clips with known native durations on an allocated timeline.
    StockFootage {
        timeline: Vec<TimelineSlot>,
        assets: Vec<VisualAsset>,
        voiceover: AudioTrack,
        captions: Vec<CaptionSegment>,
        #[serde(default)]
        overlays: Vec<Overlay>,
        #[serde(default)]
        aspect: AspectRatio,
    },
}

impl RenderRequest {
    /// Flow name as used in logs and backend payloads.
    pub fn flow_name(&self) -> &'static str {
        match self {
            RenderRequest::SingleAsset { .. } => "single_asset",
            RenderRequest::MultiAsset { .. } => "multi_asset",
            RenderRequest::StockFootage { .. } => "stock_footage",
        }
    }

    /// The voiceover track shared by all flows.
    pub fn voiceover(&self) -> &AudioTrack {
        match self {
            RenderRequest::SingleAsset { voiceover, .. } => voiceover,
            RenderRequest::MultiAsset { voiceover, .. } => voiceover,
            RenderRequest::StockFootage { voiceover, .. } => voiceover,
        }
    }

    /// Caption segments shared by all flows.
    pub fn captions(&self) -> &[CaptionSegment] {
        match self {
            RenderRequest::SingleAsset { captions, .. } => captions,
            RenderRequest::MultiAsset { captions, .. } => captions,
            RenderRequest::StockFootage { captions, .. } => captions,
        }
    }

    /// The allocated timeline, if this flow carries one.
    pub fn timeline(&self) -> Option<&[TimelineSlot]> {
        match self {
            RenderRequest::SingleAsset { .. } => None,
            RenderRequest::MultiAsset { timeline, .. } => Some(timeline),
            RenderRequest::StockFootage { timeline, .. } => Some(timeline),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use test_fixtures::single_asset_request;

    #[test]
    fn test_flow_tag_serialization() {
        let request = single_asset_request();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["flow"], "single_asset");
        assert_eq!(json["aspect"], "vertical");
    }

    #[test]
    fn test_aspect_ratio_parsing() {
        assert_eq!("9:16".parse::<AspectRatio>().unwrap(), AspectRatio::Vertical);
        assert_eq!("wide".parse::<AspectRatio>().unwrap(), AspectRatio::Wide);
        assert!("4:3".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_request_accessors() {
        let request = single_asset_request();
        assert_eq!(request.flow_name(), "single_asset");
        assert_eq!(request.voiceover().duration_secs, 30.0);
        assert!(request.timeline().is_none());
    }
}
