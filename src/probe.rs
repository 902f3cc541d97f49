//! Video metadata probing via ffprobe

use std::path::Path;
use std::process::{Command, Stdio};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::VideoMetadata;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
    bit_rate: Option<String>,
}

/// Probe a video file and return its metadata.
///
/// Fails with [`Error::NotFound`] if the path does not exist and with
/// [`Error::Probe`] when ffprobe exits non-zero, produces unparseable
/// output, or reports no video stream.
pub fn probe(video_path: &Path) -> Result<VideoMetadata> {
    if !video_path.exists() {
        return Err(Error::NotFound(video_path.to_path_buf()));
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(video_path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| Error::Probe(format!("failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Probe(format!("ffprobe failed: {}", stderr.trim())));
    }

    let parsed: ProbeOutput = serde_json::from_slice(&output.stdout)
        .map_err(|e| Error::Probe(format!("failed to parse ffprobe output: {}", e)))?;

    metadata_from_probe(parsed)
}

fn metadata_from_probe(parsed: ProbeOutput) -> Result<VideoMetadata> {
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| Error::Probe("no video stream found in file".to_string()))?;

    let width = stream.width.unwrap_or(0);
    let height = stream.height.unwrap_or(0);
    if width == 0 || height == 0 {
        return Err(Error::Probe(
            "video stream reports zero dimensions".to_string(),
        ));
    }

    let rate_str = stream.r_frame_rate.as_deref().unwrap_or("30/1");
    let frame_rate = parse_frame_rate(rate_str)?;

    let format = parsed.format;
    let duration = format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    // Container-level bit_rate is often absent; that is not an error.
    let bitrate = format
        .as_ref()
        .and_then(|f| f.bit_rate.as_deref())
        .and_then(|b| b.parse::<u64>().ok())
        .unwrap_or(0);

    Ok(VideoMetadata {
        duration,
        width,
        height,
        frame_rate,
        codec_name: stream
            .codec_name
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
        bitrate,
    })
}

/// Parse ffprobe's rational frame rate representation ("num/den").
fn parse_frame_rate(rate: &str) -> Result<f64> {
    let mut parts = rate.splitn(2, '/');
    let num: f64 = parts
        .next()
        .and_then(|p| p.trim().parse().ok())
        .ok_or_else(|| Error::Probe(format!("invalid frame rate '{}'", rate)))?;
    let den: f64 = match parts.next() {
        Some(d) => d
            .trim()
            .parse()
            .map_err(|_| Error::Probe(format!("invalid frame rate '{}'", rate)))?,
        None => 1.0,
    };
    if den == 0.0 {
        return Err(Error::Probe(format!(
            "frame rate '{}' has zero denominator",
            rate
        )));
    }
    Ok(num / den)
}
