//! autothumb: AI-assisted YouTube thumbnail generation
//!
//! Samples frames from a video with ffmpeg, asks Claude Vision to pick the
//! best one and draft overlay text, then renders the styled text onto the
//! chosen frame.

pub mod analyzer;
pub mod composer;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod probe;
pub mod sampler;
pub mod types;

pub use analyzer::VisionClient;
pub use composer::{compose, Anchor, StyleOverrides, StylePreset};
pub use config::AppConfig;
pub use error::{Error, Result};
pub use probe::probe;
pub use types::{FrameAnalysis, FrameScore, OverlayText, Resolution, VideoMetadata};
