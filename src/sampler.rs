//! Frame extraction from video files using ffmpeg
//! Frames are downscaled to a fixed working width to bound the payload
//! later sent to the vision model.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::debug;

use crate::error::{Error, Result};

/// Width in pixels that sampled frames are downscaled to (aspect preserved)
pub const WORKING_WIDTH: u32 = 1280;

/// Default number of seconds skipped at the head of the video
pub const DEFAULT_SKIP_START: f64 = 2.0;

/// Default number of seconds skipped at the tail of the video
pub const DEFAULT_SKIP_END: f64 = 2.0;

/// Compute evenly spaced sample timestamps over the usable span of a video.
///
/// The usable span excludes `skip_start` seconds at the head and `skip_end`
/// at the tail; the first and last timestamps sit exactly on its endpoints.
/// A single-frame request samples the midpoint of the span.
pub fn even_timestamps(
    duration: f64,
    count: usize,
    skip_start: f64,
    skip_end: f64,
) -> Result<Vec<f64>> {
    if count == 0 {
        return Err(Error::Validation("frame count must be at least 1".to_string()));
    }

    let usable = duration - skip_start - skip_end;
    if usable <= 0.0 {
        return Err(Error::Validation(format!(
            "video too short: {:.1}s leaves no usable span after skipping \
             {:.1}s at the start and {:.1}s at the end",
            duration, skip_start, skip_end
        )));
    }

    if count == 1 {
        return Ok(vec![skip_start + usable / 2.0]);
    }

    Ok((0..count)
        .map(|i| skip_start + i as f64 * usable / (count - 1) as f64)
        .collect())
}

/// Extract `count` evenly spaced frames into `output_dir`.
///
/// Each timestamp triggers one independent ffmpeg invocation; the first
/// failure aborts the whole batch with ffmpeg's diagnostics. Output files
/// are named `frame_0001.jpg`, `frame_0002.jpg`, ... so a lexical sort of
/// the returned paths reproduces chronological order.
pub fn extract_even(
    video_path: &Path,
    duration: f64,
    count: usize,
    output_dir: &Path,
    skip_start: f64,
    skip_end: f64,
) -> Result<Vec<PathBuf>> {
    if !video_path.exists() {
        return Err(Error::NotFound(video_path.to_path_buf()));
    }

    let timestamps = even_timestamps(duration, count, skip_start, skip_end)?;
    fs::create_dir_all(output_dir)?;

    let mut frames = Vec::with_capacity(timestamps.len());
    for (idx, timestamp) in timestamps.iter().enumerate() {
        let frame_path = output_dir.join(frame_name(idx + 1));
        debug!("extracting frame {} at {:.3}s", idx + 1, timestamp);
        extract_single(video_path, *timestamp, &frame_path, true)?;

        if !frame_path.exists() {
            return Err(Error::Extraction(format!(
                "ffmpeg reported success but produced no frame at {:.3}s",
                timestamp
            )));
        }
        frames.push(frame_path);
    }

    Ok(frames)
}

/// Extract frames at a fixed interval, at most `max_frames` of them.
///
/// Unlike [`extract_even`], this is a single ffmpeg invocation with a single
/// success or failure outcome.
pub fn extract_interval(
    video_path: &Path,
    interval_seconds: f64,
    output_dir: &Path,
    max_frames: usize,
) -> Result<Vec<PathBuf>> {
    if !video_path.exists() {
        return Err(Error::NotFound(video_path.to_path_buf()));
    }
    if interval_seconds <= 0.0 {
        return Err(Error::Validation(
            "interval must be greater than zero seconds".to_string(),
        ));
    }

    fs::create_dir_all(output_dir)?;
    let pattern = output_dir.join("frame_%04d.jpg");

    let output = Command::new("ffmpeg")
        .arg("-hide_banner")
        .arg("-i")
        .arg(video_path)
        .arg("-vf")
        .arg(format!("fps=1/{},scale={}:-1", interval_seconds, WORKING_WIDTH))
        .arg("-frames:v")
        .arg(max_frames.to_string())
        .arg("-q:v")
        .arg("2")
        .arg(&pattern)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| Error::Extraction(format!("failed to run ffmpeg: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Extraction(format!(
            "ffmpeg interval extraction failed: {}",
            stderr.trim()
        )));
    }

    let mut frames: Vec<PathBuf> = fs::read_dir(output_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("frame_") && n.ends_with(".jpg"))
                .unwrap_or(false)
        })
        .collect();
    frames.sort();

    Ok(frames)
}

/// Extract a single frame at `timestamp` (source resolution, no downscale).
pub fn extract_at(video_path: &Path, timestamp: f64, output_path: &Path) -> Result<PathBuf> {
    if !video_path.exists() {
        return Err(Error::NotFound(video_path.to_path_buf()));
    }
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    extract_single(video_path, timestamp, output_path, false)?;
    Ok(output_path.to_path_buf())
}

/// Zero-padded frame file name for a 1-based ordinal
fn frame_name(ordinal: usize) -> String {
    format!("frame_{:04}.jpg", ordinal)
}

fn extract_single(
    video_path: &Path,
    timestamp: f64,
    frame_path: &Path,
    downscale: bool,
) -> Result<()> {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-hide_banner")
        .arg("-ss")
        .arg(timestamp.to_string())
        .arg("-i")
        .arg(video_path)
        .arg("-vframes")
        .arg("1");
    if downscale {
        cmd.arg("-vf").arg(format!("scale={}:-1", WORKING_WIDTH));
    }
    let output = cmd
        .arg("-q:v")
        .arg("2")
        .arg("-y")
        .arg(frame_path)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| Error::Extraction(format!("failed to run ffmpeg: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Extraction(format!(
            "ffmpeg failed at {:.3}s: {}",
            timestamp,
            stderr.trim()
        )));
    }

    Ok(())
}
