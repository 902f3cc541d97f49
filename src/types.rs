//! Shared data types for autothumb

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Metadata extracted from a video file via ffprobe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Duration in seconds
    pub duration: f64,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Frames per second
    pub frame_rate: f64,
    /// Video codec name (e.g. "h264")
    pub codec_name: String,
    /// Container bitrate in bits per second (0 when absent)
    pub bitrate: u64,
}

impl VideoMetadata {
    /// Whether the source is taller than it is wide (shorts-style video)
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }
}

/// Per-frame assessment returned by the vision model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameScore {
    pub index: usize,
    /// Score from 1 to 10
    #[serde(default)]
    pub score: u8,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    /// Suitability for text overlay
    #[serde(default, rename = "thumbnail_suitability")]
    pub suitability: String,
}

/// Result of asking the vision model to pick the best frame
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    /// 0-based index into the sampled frame list
    pub best_frame_index: usize,
    /// Path of the selected frame; always `frames[best_frame_index]`
    pub best_frame: PathBuf,
    /// Model's free-text justification
    pub reasoning: String,
    /// Per-frame scores (empty when the response had no parseable JSON)
    pub scores: Vec<FrameScore>,
}

/// Overlay text drafted by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayText {
    pub main_text: String,
    #[serde(default)]
    pub subtext: Option<String>,
    #[serde(default)]
    pub reasoning: String,
}

/// Named output resolution for thumbnails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Hd720,
    Hd1080,
}

impl Resolution {
    /// Parse a resolution name as accepted on the command line
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "720p" => Some(Self::Hd720),
            "1080p" => Some(Self::Hd1080),
            _ => None,
        }
    }

    /// Landscape pixel dimensions for this resolution
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Hd720 => (1280, 720),
            Self::Hd1080 => (1920, 1080),
        }
    }

    /// Dimensions adapted to the source video: swapped for portrait input
    pub fn for_source(self, metadata: &VideoMetadata) -> (u32, u32) {
        let (w, h) = self.dimensions();
        if metadata.is_portrait() {
            (h, w)
        } else {
            (w, h)
        }
    }
}
