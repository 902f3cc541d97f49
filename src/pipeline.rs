//! Pipeline orchestration shared by the generate and analyze commands
//! Sequences probe -> sample -> analyze and manages the sampled-frames
//! directory lifetime.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::analyzer::VisionClient;
use crate::config::AppConfig;
use crate::error::Result;
use crate::probe;
use crate::sampler::{self, DEFAULT_SKIP_END, DEFAULT_SKIP_START};
use crate::types::{FrameAnalysis, OverlayText, VideoMetadata};

/// Default bound on overlay main-text length, in words
pub const DEFAULT_MAX_WORDS: usize = 6;

/// Everything the analysis half of the pipeline produces.
///
/// The sampled frame paths stay alive here so composition can read the
/// selected frame before the directory is cleaned up.
pub struct PipelineOutcome {
    pub metadata: VideoMetadata,
    pub frames: Vec<PathBuf>,
    pub analysis: FrameAnalysis,
    pub text: OverlayText,
}

/// Removes a sampled-frames directory when dropped, on success and
/// failure alike. A directory that never got created is fine.
pub struct FramesDirGuard {
    path: PathBuf,
}

impl FramesDirGuard {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Drop for FramesDirGuard {
    fn drop(&mut self) {
        if self.path.exists() {
            if let Err(e) = fs::remove_dir_all(&self.path) {
                log::warn!(
                    "failed to clean up frames directory {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

/// Probe the video, sample frames into `frames_dir`, then run frame
/// selection and text generation against the vision model.
pub async fn sample_and_analyze(
    config: &AppConfig,
    video_path: &Path,
    prompt: &str,
    frame_count: usize,
    frames_dir: &Path,
    style: &str,
    max_words: usize,
) -> Result<PipelineOutcome> {
    let metadata = probe::probe(video_path)?;
    info!(
        "video loaded: {:.1}s, {}x{}, {} fps",
        metadata.duration, metadata.width, metadata.height, metadata.frame_rate
    );

    let frames = sampler::extract_even(
        video_path,
        metadata.duration,
        frame_count,
        frames_dir,
        DEFAULT_SKIP_START,
        DEFAULT_SKIP_END,
    )?;
    info!("extracted {} frames to {}", frames.len(), frames_dir.display());

    let client = VisionClient::new(config)?;
    let (analysis, text) = client
        .analyze_and_generate(&frames, prompt, style, max_words)
        .await?;
    info!(
        "selected frame #{} with text \"{}\"",
        analysis.best_frame_index + 1,
        text.main_text
    );

    Ok(PipelineOutcome {
        metadata,
        frames,
        analysis,
        text,
    })
}
