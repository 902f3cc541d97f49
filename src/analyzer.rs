//! Claude Vision integration for autothumb
//! Handles frame selection and thumbnail text generation over the
//! Anthropic Messages API.

use std::fs;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use log::{debug, warn};
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::types::{FrameAnalysis, FrameScore, OverlayText};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Frame-selection criteria presented to the model when the caller
/// supplies none
const DEFAULT_CRITERIA: &[(&str, &str)] = &[
    ("visual_appeal", "Clear, well-lit, and visually engaging"),
    ("composition", "Good framing and subject positioning"),
    (
        "text_overlay",
        "Space for text overlay without obscuring key elements",
    ),
    (
        "engagement",
        "Likely to attract clicks and viewer interest",
    ),
    ("clarity", "Sharp focus, not blurry or transitional"),
];

/// Vocabulary hints for each text style
const STYLE_GUIDELINES: &[(&str, &str)] = &[
    (
        "youtube",
        "Engaging, attention-grabbing, uses power words, creates curiosity",
    ),
    ("minimalist", "Clean, simple, direct, 2-3 words max"),
    ("bold", "Strong, impactful, uses action verbs and emotion"),
    ("tech", "Professional, technical, clear value proposition"),
    (
        "clickbait",
        "Extremely attention-grabbing, uses numbers, urgency, curiosity gaps",
    ),
];

/// Claude Messages API client
pub struct VisionClient {
    client: Client,
    api_key: String,
    model: String,
}

// Request body types

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ContentBlock {
    Image { source: ImageSource },
    Text { text: String },
}

#[derive(Debug, Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: String,
    data: String,
}

// Response body types

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Option<Vec<ResponseBlock>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Shape of the structured analysis the model is asked to return
#[derive(Debug, Default, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    best_frame_index: usize,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    frames: Vec<FrameScore>,
}

impl VisionClient {
    /// Create a client from the loaded configuration.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Service(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Analyze sampled frames and pick the best one for a thumbnail.
    ///
    /// The response is expected to contain one JSON object; when none is
    /// found the call degrades to frame 0 with the raw text as reasoning
    /// instead of failing.
    pub async fn select_best_frame(
        &self,
        frames: &[PathBuf],
        description: &str,
        criteria: Option<&[(&str, &str)]>,
    ) -> Result<FrameAnalysis> {
        if frames.is_empty() {
            return Err(Error::Validation(
                "no frames provided for analysis".to_string(),
            ));
        }

        let mut content = Vec::with_capacity(frames.len() + 1);
        for frame in frames {
            if !frame.exists() {
                return Err(Error::NotFound(frame.clone()));
            }
            let data = fs::read(frame)?;
            content.push(ContentBlock::Image {
                source: ImageSource {
                    source_type: "base64",
                    media_type: media_type_for(frame).to_string(),
                    data: BASE64.encode(data),
                },
            });
        }
        content.push(ContentBlock::Text {
            text: selection_prompt(
                description,
                frames.len(),
                criteria.unwrap_or(DEFAULT_CRITERIA),
            ),
        });

        let text = self.send_message(content, 2048).await?;
        debug!("frame analysis response: {} bytes", text.len());

        let raw = parse_analysis(&text);

        if raw.best_frame_index >= frames.len() {
            return Err(Error::Service(format!(
                "model selected frame {} but only {} frames were provided",
                raw.best_frame_index,
                frames.len()
            )));
        }

        Ok(FrameAnalysis {
            best_frame_index: raw.best_frame_index,
            best_frame: frames[raw.best_frame_index].clone(),
            reasoning: raw.reasoning,
            scores: raw.frames,
        })
    }

    /// Draft overlay text for the thumbnail in the given style.
    ///
    /// Falls back to a truncation of the description when the response
    /// carries no parseable JSON.
    pub async fn generate_overlay_text(
        &self,
        description: &str,
        style: &str,
        max_words: usize,
    ) -> Result<OverlayText> {
        let content = vec![ContentBlock::Text {
            text: text_prompt(description, style, max_words),
        }];

        let text = self.send_message(content, 1024).await?;
        debug!("text generation response: {} bytes", text.len());

        Ok(parse_overlay(&text, description, max_words))
    }

    /// Combined analysis: best frame plus overlay text, two requests.
    pub async fn analyze_and_generate(
        &self,
        frames: &[PathBuf],
        description: &str,
        style: &str,
        max_words: usize,
    ) -> Result<(FrameAnalysis, OverlayText)> {
        let analysis = self.select_best_frame(frames, description, None).await?;
        let text = self
            .generate_overlay_text(description, style, max_words)
            .await?;
        Ok((analysis, text))
    }

    /// Send one user message and return the first text block of the reply.
    async fn send_message(&self, content: Vec<ContentBlock>, max_tokens: u32) -> Result<String> {
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens,
            messages: vec![Message {
                role: "user",
                content,
            }],
        };

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Service(format!("request to Claude API failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Service(format!("failed to read Claude API response: {}", e)))?;

        let parsed: MessagesResponse = serde_json::from_str(&body).map_err(|_| {
            Error::Service(format!(
                "unexpected Claude API response (HTTP {}): {}",
                status,
                body.chars().take(200).collect::<String>()
            ))
        })?;

        if let Some(error) = parsed.error {
            return Err(Error::Service(format!(
                "Claude API error (HTTP {}): {}",
                status, error.message
            )));
        }

        parsed
            .content
            .and_then(|blocks| blocks.into_iter().next())
            .and_then(|block| block.text)
            .ok_or_else(|| Error::Service("no text content in Claude API response".to_string()))
    }
}

/// Find the greedy first-brace-to-last-brace region of a model reply.
fn extract_json_region(text: &str) -> Option<&str> {
    let re = Regex::new(r"(?s)\{.*\}").ok()?;
    re.find(text).map(|m| m.as_str())
}

/// Map a frame-selection reply to a [`RawAnalysis`].
///
/// A reply without a parseable JSON object degrades to frame 0 with the
/// raw text as reasoning and no per-frame scores.
fn parse_analysis(text: &str) -> RawAnalysis {
    match extract_json_region(text)
        .and_then(|region| serde_json::from_str::<RawAnalysis>(region).ok())
    {
        Some(raw) => raw,
        None => {
            warn!("no parseable JSON in frame analysis response, defaulting to frame 0");
            RawAnalysis {
                best_frame_index: 0,
                reasoning: text.to_string(),
                frames: Vec::new(),
            }
        }
    }
}

/// Map a text-generation reply to an [`OverlayText`], falling back to a
/// truncation of the description when no parseable JSON is present.
fn parse_overlay(text: &str, description: &str, max_words: usize) -> OverlayText {
    extract_json_region(text)
        .and_then(|region| serde_json::from_str::<OverlayText>(region).ok())
        .unwrap_or_else(|| {
            warn!("no parseable JSON in text response, using truncated description");
            OverlayText {
                main_text: fallback_text(description, max_words),
                subtext: None,
                reasoning: "fallback text generation".to_string(),
            }
        })
}

/// Media type from a frame's file extension
fn media_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

/// First `max_words` words of the description, uppercased
fn fallback_text(description: &str, max_words: usize) -> String {
    description
        .split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

fn selection_prompt(description: &str, frame_count: usize, criteria: &[(&str, &str)]) -> String {
    let criteria_text = criteria
        .iter()
        .map(|(name, desc)| format!("- {}: {}", name, desc))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an expert at analyzing video frames to select the best thumbnail image for YouTube videos.

Video Description: {description}

I'm providing you with {frame_count} frames from a video. Please analyze each frame based on these criteria:
{criteria_text}

For each frame, provide:
1. A score from 1-10
2. Brief assessment of strengths and weaknesses
3. Suitability for thumbnail with text overlay

Finally, recommend which frame would make the best thumbnail and explain why.

Format your response as JSON with this structure:
{{
    "frames": [
        {{
            "index": 0,
            "score": 8,
            "strengths": ["clear subject", "good lighting"],
            "weaknesses": ["slightly off-center"],
            "thumbnail_suitability": "Good space for text overlay at top"
        }}
    ],
    "best_frame_index": 3,
    "reasoning": "Frame 3 is the best choice because..."
}}"#
    )
}

fn text_prompt(description: &str, style: &str, max_words: usize) -> String {
    let style_guide = STYLE_GUIDELINES
        .iter()
        .find(|(name, _)| *name == style)
        .or_else(|| STYLE_GUIDELINES.iter().find(|(name, _)| *name == "youtube"))
        .map(|(_, guide)| *guide)
        .unwrap_or_default();

    format!(
        r#"You are an expert at creating catchy, effective thumbnail text for YouTube videos.

Video Description: {description}

Style: {style}
Style Guidelines: {style_guide}
Maximum Words: {max_words}

Create compelling thumbnail text that will:
1. Grab attention immediately
2. Clearly communicate the video's value
3. Encourage clicks without being misleading
4. Work well visually when overlaid on an image

Provide:
- Main text (large, primary text - max {max_words} words)
- Optional subtext (smaller supporting text - 1-3 words)
- Brief reasoning for your choices

Format as JSON:
{{
    "main_text": "YOUR MAIN TEXT HERE",
    "subtext": "optional subtext",
    "reasoning": "why this text is effective..."
}}"#
    )
}
