//! Error types for the autothumb pipeline
//! One variant per failure class; degraded model output is not an error.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the thumbnail pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid runtime configuration (API key, bad settings).
    #[error("configuration error: {0}")]
    Config(String),

    /// An input file (video or image) does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// ffprobe failed or returned unusable metadata.
    #[error("probe failed: {0}")]
    Probe(String),

    /// Caller-supplied parameters are unusable (e.g. video too short).
    #[error("validation failed: {0}")]
    Validation(String),

    /// ffmpeg frame extraction failed; carries ffmpeg's own diagnostics.
    #[error("frame extraction failed: {0}")]
    Extraction(String),

    /// Hosted model transport, auth, or API failure.
    #[error("vision service error: {0}")]
    Service(String),

    /// Image decode, draw, or encode failure during composition.
    #[error("render failed: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::NotFound(PathBuf::from("/tmp/missing.mp4"));
        assert_eq!(err.to_string(), "file not found: /tmp/missing.mp4");
    }

    #[test]
    fn test_extraction_carries_tool_output() {
        let err = Error::Extraction("ffmpeg: Invalid data found".to_string());
        assert!(err.to_string().contains("Invalid data found"));
    }
}
