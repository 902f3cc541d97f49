//! Thumbnail composition: style presets and text overlay rendering
//! Resizes the chosen frame, draws an optional translucent band, then
//! word-wrapped text with shadow and outline, and writes the final JPEG.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, FontVec, PxScale};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size, Blend};
use imageproc::rect::Rect;
use log::debug;

use crate::error::{Error, Result};

/// JPEG quality for the final thumbnail
const JPEG_QUALITY: u8 = 95;

/// Band height as a fraction of the image height
const BAND_HEIGHT_RATIO: f32 = 0.4;

/// Fraction of the target width that wrapped text may occupy
const TEXT_WIDTH_RATIO: f32 = 0.9;

/// Vertical margin for top/bottom anchored text, in pixels
const EDGE_MARGIN: i32 = 50;

/// Gap between the main text block and the subtext block, in pixels
const BLOCK_GAP: i32 = 20;

/// Mild sharpening kernel applied before encoding
const SHARPEN_KERNEL: [f32; 9] = [0.0, -0.2, 0.0, -0.2, 1.8, -0.2, 0.0, -0.2, 0.0];

/// Translucent black used for drop shadows
const SHADOW_COLOR: Rgba<u8> = Rgba([0, 0, 0, 180]);

/// Bundled fallback face used when no system font candidate is usable
const FALLBACK_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Vertical placement of the text block and background band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Top,
    Center,
    Bottom,
}

impl Anchor {
    /// Position name as shown in the styles listing
    pub fn as_str(self) -> &'static str {
        match self {
            Anchor::Top => "top",
            Anchor::Center => "center",
            Anchor::Bottom => "bottom",
        }
    }
}

/// A named, immutable bundle of rendering parameters
#[derive(Debug, Clone)]
pub struct StylePreset {
    pub name: &'static str,
    pub main_font_size: f32,
    pub sub_font_size: f32,
    pub text_color: [u8; 3],
    /// No outline is drawn when absent or when `outline_width` is 0
    pub outline_color: Option<[u8; 3]>,
    pub outline_width: i32,
    pub anchor: Anchor,
    /// Opacity of the background band in [0, 1]; 0 disables the band
    pub band_opacity: f32,
    pub drop_shadow: bool,
    pub bold: bool,
}

/// Built-in style presets
pub const STYLES: [StylePreset; 4] = [
    StylePreset {
        name: "youtube",
        main_font_size: 72.0,
        sub_font_size: 36.0,
        text_color: [255, 255, 255],
        outline_color: Some([0, 0, 0]),
        outline_width: 4,
        anchor: Anchor::Center,
        band_opacity: 0.3,
        drop_shadow: true,
        bold: true,
    },
    StylePreset {
        name: "minimalist",
        main_font_size: 60.0,
        sub_font_size: 30.0,
        text_color: [255, 255, 255],
        outline_color: None,
        outline_width: 0,
        anchor: Anchor::Bottom,
        band_opacity: 0.5,
        drop_shadow: false,
        bold: false,
    },
    StylePreset {
        name: "bold",
        main_font_size: 120.0,
        sub_font_size: 50.0,
        text_color: [255, 215, 0],
        outline_color: Some([0, 0, 0]),
        outline_width: 6,
        anchor: Anchor::Center,
        band_opacity: 0.4,
        drop_shadow: true,
        bold: true,
    },
    StylePreset {
        name: "tech",
        main_font_size: 64.0,
        sub_font_size: 32.0,
        text_color: [0, 255, 255],
        outline_color: Some([0, 0, 0]),
        outline_width: 3,
        anchor: Anchor::Top,
        band_opacity: 0.6,
        drop_shadow: true,
        bold: false,
    },
];

impl StylePreset {
    /// Look up a built-in preset by name
    pub fn builtin(name: &str) -> Option<&'static StylePreset> {
        STYLES.iter().find(|s| s.name == name)
    }

    /// All built-in presets, for listing
    pub fn all() -> &'static [StylePreset] {
        &STYLES
    }

    /// Return a copy with the given overrides applied; the preset itself
    /// is never mutated.
    pub fn with_overrides(&self, overrides: &StyleOverrides) -> StylePreset {
        let mut style = self.clone();
        if let Some(size) = overrides.main_font_size {
            style.main_font_size = size;
        }
        if let Some(size) = overrides.sub_font_size {
            style.sub_font_size = size;
        }
        if let Some(color) = overrides.text_color {
            style.text_color = color;
        }
        if let Some(color) = overrides.outline_color {
            style.outline_color = color;
        }
        if let Some(width) = overrides.outline_width {
            style.outline_width = width;
        }
        if let Some(anchor) = overrides.anchor {
            style.anchor = anchor;
        }
        if let Some(opacity) = overrides.band_opacity {
            style.band_opacity = opacity;
        }
        if let Some(shadow) = overrides.drop_shadow {
            style.drop_shadow = shadow;
        }
        if let Some(bold) = overrides.bold {
            style.bold = bold;
        }
        style
    }
}

/// Per-call partial style override; unset fields keep the preset value
#[derive(Debug, Clone, Default)]
pub struct StyleOverrides {
    pub main_font_size: Option<f32>,
    pub sub_font_size: Option<f32>,
    pub text_color: Option<[u8; 3]>,
    /// `Some(None)` removes the outline entirely
    pub outline_color: Option<Option<[u8; 3]>>,
    pub outline_width: Option<i32>,
    pub anchor: Option<Anchor>,
    pub band_opacity: Option<f32>,
    pub drop_shadow: Option<bool>,
    pub bold: Option<bool>,
}

/// Compose a thumbnail from `image_path` and write it to `output_path`.
///
/// The base image is stretched to exactly `resolution`; callers are
/// responsible for passing an aspect-correct target. Parent directories of
/// the output path are created as needed.
pub fn compose(
    image_path: &Path,
    main_text: &str,
    output_path: &Path,
    subtext: Option<&str>,
    resolution: (u32, u32),
    style: &StylePreset,
    overrides: Option<&StyleOverrides>,
) -> Result<PathBuf> {
    if !image_path.exists() {
        return Err(Error::NotFound(image_path.to_path_buf()));
    }

    let image = image::open(image_path)
        .map_err(|e| Error::Render(format!("failed to load {}: {}", image_path.display(), e)))?;

    let style = match overrides {
        Some(overrides) => style.with_overrides(overrides),
        None => style.clone(),
    };

    let rendered = render(image, main_text, subtext, resolution, &style)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    let mut encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
    encoder
        .encode_image(&rendered)
        .map_err(|e| Error::Render(format!("failed to encode JPEG: {}", e)))?;

    debug!("wrote thumbnail to {}", output_path.display());
    Ok(output_path.to_path_buf())
}

/// Render the thumbnail in memory.
fn render(
    image: DynamicImage,
    main_text: &str,
    subtext: Option<&str>,
    resolution: (u32, u32),
    style: &StylePreset,
) -> Result<RgbImage> {
    let (width, height) = resolution;
    let mut canvas: RgbaImage = image
        .resize_exact(width, height, FilterType::Lanczos3)
        .to_rgba8();

    if style.band_opacity > 0.0 {
        apply_band(&mut canvas, style.anchor, style.band_opacity);
    }

    let main_font = load_font(style.bold)?;
    let sub_font = load_font(false)?;
    let main_scale = PxScale::from(style.main_font_size);
    let sub_scale = PxScale::from(style.sub_font_size);

    let max_width = (width as f32 * TEXT_WIDTH_RATIO) as u32;
    let main_lines = wrap_text(main_text, &main_font, main_scale, max_width);
    let sub_lines = subtext.map(|s| wrap_text(s, &sub_font, sub_scale, max_width));

    let main_line_height = style.main_font_size as i32 + 10;
    let sub_line_height = style.sub_font_size as i32 + 10;

    let mut block_height = main_lines.len() as i32 * main_line_height;
    if let Some(lines) = &sub_lines {
        block_height += lines.len() as i32 * sub_line_height + BLOCK_GAP;
    }

    let mut y = block_top(style.anchor, height as i32, block_height);

    // Alpha-blending canvas so the translucent shadow actually darkens
    // the pixels underneath instead of overwriting them.
    let mut canvas = Blend(canvas);

    for line in &main_lines {
        draw_line(
            &mut canvas,
            line,
            y,
            &main_font,
            main_scale,
            style,
            style.outline_width,
            5,
        );
        y += main_line_height;
    }

    if let Some(lines) = &sub_lines {
        y += BLOCK_GAP;
        let sub_outline = (style.outline_width - 1).max(1);
        for line in lines {
            draw_line(
                &mut canvas,
                line,
                y,
                &sub_font,
                sub_scale,
                style,
                sub_outline,
                3,
            );
            y += sub_line_height;
        }
    }

    let rgb = DynamicImage::ImageRgba8(canvas.0).to_rgb8();
    Ok(image::imageops::filter3x3(&rgb, &SHARPEN_KERNEL))
}

/// Top edge of the text block for an anchor position
fn block_top(anchor: Anchor, canvas_height: i32, block_height: i32) -> i32 {
    match anchor {
        Anchor::Top => EDGE_MARGIN,
        Anchor::Bottom => canvas_height - block_height - EDGE_MARGIN,
        Anchor::Center => (canvas_height - block_height) / 2,
    }
}

/// Draw a blurred, semi-transparent horizontal band behind the text area.
fn apply_band(canvas: &mut RgbaImage, anchor: Anchor, opacity: f32) {
    let (width, height) = canvas.dimensions();
    let band_height = (height as f32 * BAND_HEIGHT_RATIO) as u32;
    if band_height == 0 {
        return;
    }

    let y_start = match anchor {
        Anchor::Top => 0,
        Anchor::Bottom => height.saturating_sub(band_height),
        Anchor::Center => (height - band_height) / 2,
    };

    let alpha = (255.0 * opacity.clamp(0.0, 1.0)).round() as u8;
    let mut band = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    draw_filled_rect_mut(
        &mut band,
        Rect::at(0, y_start as i32).of_size(width, band_height),
        Rgba([0, 0, 0, alpha]),
    );
    // Soften the band edges before compositing.
    let band = image::imageops::blur(&band, 10.0);
    image::imageops::overlay(canvas, &band, 0, 0);
}

/// Draw one horizontally centered line with optional shadow and outline.
#[allow(clippy::too_many_arguments)]
fn draw_line(
    canvas: &mut Blend<RgbaImage>,
    text: &str,
    y: i32,
    font: &FontArc,
    scale: PxScale,
    style: &StylePreset,
    outline_width: i32,
    shadow_offset: i32,
) {
    let (line_width, _) = text_size(scale, font, text);
    let x = (canvas.0.width() as i32 - line_width as i32) / 2;

    if style.drop_shadow {
        draw_text_mut(
            canvas,
            SHADOW_COLOR,
            x + shadow_offset,
            y + shadow_offset,
            scale,
            font,
            text,
        );
    }

    if let Some([r, g, b]) = style.outline_color {
        if outline_width > 0 {
            let outline = Rgba([r, g, b, 255]);
            for dx in -outline_width..=outline_width {
                for dy in -outline_width..=outline_width {
                    if dx != 0 || dy != 0 {
                        draw_text_mut(canvas, outline, x + dx, y + dy, scale, font, text);
                    }
                }
            }
        }
    }

    let [r, g, b] = style.text_color;
    draw_text_mut(canvas, Rgba([r, g, b, 255]), x, y, scale, font, text);
}

/// Greedy word wrap by measured pixel width.
///
/// Words accumulate while the line stays within `max_width`; a single word
/// wider than the limit still gets its own line.
fn wrap_text(text: &str, font: &FontArc, scale: PxScale, max_width: u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current.join(" "), word)
        };
        let (candidate_width, _) = text_size(scale, font, &candidate);
        if candidate_width as u32 <= max_width {
            current.push(word);
        } else {
            if !current.is_empty() {
                lines.push(current.join(" "));
            }
            current = vec![word];
        }
    }
    if !current.is_empty() {
        lines.push(current.join(" "));
    }

    lines
}

/// Load a font face, preferring common system fonts and falling back to
/// the bundled face.
fn load_font(bold: bool) -> Result<FontArc> {
    let candidates: &[&str] = if bold {
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
            "/System/Library/Fonts/Helvetica.ttc",
            "arial.ttf",
        ]
    } else {
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/System/Library/Fonts/Helvetica.ttc",
            "arial.ttf",
        ]
    };

    for candidate in candidates {
        let path = Path::new(candidate);
        if !path.exists() {
            continue;
        }
        if let Ok(bytes) = fs::read(path) {
            if let Ok(font) = FontVec::try_from_vec(bytes) {
                return Ok(FontArc::from(font));
            }
        }
    }

    FontArc::try_from_slice(FALLBACK_FONT)
        .map_err(|e| Error::Render(format!("bundled fallback font is unusable: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn fallback_font() -> FontArc {
        FontArc::try_from_slice(FALLBACK_FONT).unwrap()
    }

    fn test_image() -> DynamicImage {
        let mut img = RgbImage::new(64, 48);
        for (x, _, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 4) as u8, 80, 120]);
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_builtin_presets() {
        for name in ["youtube", "minimalist", "bold", "tech"] {
            assert!(StylePreset::builtin(name).is_some(), "missing preset {}", name);
        }
        assert!(StylePreset::builtin("vaporwave").is_none());
        assert_eq!(StylePreset::all().len(), 4);
    }

    #[test]
    fn test_minimalist_has_no_outline() {
        let style = StylePreset::builtin("minimalist").unwrap();
        assert!(style.outline_color.is_none());
        assert_eq!(style.outline_width, 0);
        assert!(!style.drop_shadow);
    }

    #[test]
    fn test_bold_preset_is_gold_with_black_outline() {
        let style = StylePreset::builtin("bold").unwrap();
        assert_eq!(style.text_color, [255, 215, 0]);
        assert_eq!(style.outline_color, Some([0, 0, 0]));
        assert_eq!(style.outline_width, 6);
    }

    #[test]
    fn test_overrides_are_shallow_and_non_mutating() {
        let preset = StylePreset::builtin("youtube").unwrap();
        let merged = preset.with_overrides(&StyleOverrides {
            text_color: Some([255, 0, 0]),
            outline_color: Some(None),
            ..Default::default()
        });
        assert_eq!(merged.text_color, [255, 0, 0]);
        assert!(merged.outline_color.is_none());
        // Remaining fields keep preset values
        assert_eq!(merged.main_font_size, preset.main_font_size);
        assert_eq!(merged.anchor, preset.anchor);
        // Preset itself untouched
        assert_eq!(preset.text_color, [255, 255, 255]);
        assert_eq!(preset.outline_color, Some([0, 0, 0]));
    }

    #[test]
    fn test_block_top_anchors() {
        assert_eq!(block_top(Anchor::Top, 720, 100), 50);
        assert_eq!(block_top(Anchor::Bottom, 720, 100), 720 - 100 - 50);
        assert_eq!(block_top(Anchor::Center, 720, 100), 310);
    }

    #[test]
    fn test_wrap_text_respects_max_width() {
        let font = fallback_font();
        let scale = PxScale::from(48.0);
        let max_width = 400;
        let lines = wrap_text(
            "learn rust the practical way with real projects",
            &font,
            scale,
            max_width,
        );
        assert!(lines.len() > 1);
        for line in &lines {
            // Multi-word lines must fit; a lone word may exceed the limit.
            if line.contains(' ') {
                let (w, _) = text_size(scale, &font, line);
                assert!(w <= max_width, "line '{}' is {}px wide", line, w);
            }
        }
    }

    #[test]
    fn test_wrap_text_overlong_word_passes_through() {
        let font = fallback_font();
        let lines = wrap_text(
            "supercalifragilisticexpialidocious",
            &font,
            PxScale::from(96.0),
            50,
        );
        assert_eq!(lines, vec!["supercalifragilisticexpialidocious".to_string()]);
    }

    #[test]
    fn test_wrap_text_empty() {
        let font = fallback_font();
        assert!(wrap_text("", &font, PxScale::from(48.0), 400).is_empty());
    }

    #[test]
    fn test_render_exact_resolution() {
        let style = StylePreset::builtin("youtube").unwrap();
        let out = render(test_image(), "HELLO WORLD", None, (320, 180), style).unwrap();
        assert_eq!(out.dimensions(), (320, 180));
    }

    #[test]
    fn test_render_with_subtext() {
        let style = StylePreset::builtin("bold").unwrap();
        let out = render(test_image(), "PYTHON TIPS", Some("2024"), (320, 180), style).unwrap();
        assert_eq!(out.dimensions(), (320, 180));
    }

    #[test]
    fn test_render_draws_text() {
        let style = StylePreset::builtin("minimalist")
            .unwrap()
            .with_overrides(&StyleOverrides {
                band_opacity: Some(0.0),
                ..Default::default()
            });
        let with_text = render(test_image(), "HI", None, (320, 180), &style).unwrap();
        let blank = render(test_image(), "", None, (320, 180), &style).unwrap();
        assert_ne!(with_text.as_raw(), blank.as_raw());
    }

    #[test]
    fn test_outline_changes_output() {
        let base = StylePreset::builtin("minimalist")
            .unwrap()
            .with_overrides(&StyleOverrides {
                band_opacity: Some(0.0),
                ..Default::default()
            });
        let outlined = base.with_overrides(&StyleOverrides {
            outline_color: Some(Some([0, 0, 0])),
            outline_width: Some(3),
            ..Default::default()
        });
        let plain = render(test_image(), "HI", None, (320, 180), &base).unwrap();
        let stroked = render(test_image(), "HI", None, (320, 180), &outlined).unwrap();
        assert_ne!(plain.as_raw(), stroked.as_raw());
    }

    #[test]
    fn test_drop_shadow_is_translucent() {
        let font = fallback_font();
        let style = StylePreset::builtin("minimalist")
            .unwrap()
            .with_overrides(&StyleOverrides {
                drop_shadow: Some(true),
                ..Default::default()
            });
        // White text on white: only the shadow darkens anything.
        let mut canvas = Blend(RgbaImage::from_pixel(240, 120, Rgba([255, 255, 255, 255])));
        draw_line(&mut canvas, "HI", 30, &font, PxScale::from(48.0), &style, 0, 5);

        let darkest = canvas.0.pixels().map(|p| p.0[0]).min().unwrap();
        assert!(darkest < 255, "shadow should darken the background");
        assert!(darkest > 0, "shadow should stay translucent, not solid black");
    }

    #[test]
    fn test_compose_missing_image() {
        let style = StylePreset::builtin("youtube").unwrap();
        let err = compose(
            Path::new("/nonexistent/frame.jpg"),
            "TEXT",
            Path::new("/tmp/out.jpg"),
            None,
            (1280, 720),
            style,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_compose_writes_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("frame.png");
        test_image().save(&input).unwrap();
        let output = dir.path().join("nested/thumb.jpg");

        let style = StylePreset::builtin("tech").unwrap();
        let written = compose(&input, "RUST 2024", &output, Some("deep dive"), (320, 180), style, None)
            .unwrap();
        assert_eq!(written, output);

        let reloaded = image::open(&output).unwrap();
        assert_eq!(reloaded.width(), 320);
        assert_eq!(reloaded.height(), 180);
    }
}
