//! autothumb
//! A CLI tool that generates YouTube thumbnails from video files using
//! Claude Vision for frame selection and text overlay.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use simplelog::{ColorChoice, Config as LogConfig, TermLogger, TerminalMode};

use autothumb::composer::{self, StylePreset};
use autothumb::pipeline::{self, FramesDirGuard, DEFAULT_MAX_WORDS};
use autothumb::{probe, AppConfig, Resolution};

const STYLE_NAMES: [&str; 4] = ["youtube", "minimalist", "bold", "tech"];
const RESOLUTION_NAMES: [&str; 2] = ["720p", "1080p"];

#[derive(Parser)]
#[command(name = "autothumb")]
#[command(version)]
#[command(about = "AI-assisted YouTube thumbnail generator")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: sample frames, analyze with Claude Vision, compose
    Generate(GenerateArgs),
    /// Sample frames and run the AI analysis without rendering
    Analyze(AnalyzeArgs),
    /// Render styled text onto an existing image, no AI involved
    Compose(ComposeArgs),
    /// Print probed video metadata
    Info(InfoArgs),
    /// List built-in style presets
    Styles,
}

#[derive(Args)]
struct GenerateArgs {
    /// Input video file
    video: PathBuf,

    /// Description of the video content
    #[arg(short, long)]
    prompt: String,

    /// Output thumbnail path
    #[arg(short, long, default_value = "./output/thumbnail.jpg")]
    output: PathBuf,

    /// Thumbnail style
    #[arg(short, long, default_value = "youtube", value_parser = STYLE_NAMES)]
    style: String,

    /// Thumbnail resolution
    #[arg(short, long, default_value = "720p", value_parser = RESOLUTION_NAMES)]
    resolution: String,

    /// Number of frames to sample for analysis
    #[arg(short, long, default_value_t = 10)]
    frames: usize,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Input video file
    video: PathBuf,

    /// Description of the video content
    #[arg(short, long)]
    prompt: String,

    /// Number of frames to sample for analysis
    #[arg(short, long, default_value_t = 10)]
    frames: usize,

    /// Directory where sampled frames are kept
    #[arg(short, long, default_value = "./output/frames")]
    output_dir: PathBuf,
}

#[derive(Args)]
struct ComposeArgs {
    /// Base image file
    image: PathBuf,

    /// Main overlay text
    #[arg(short, long)]
    text: String,

    /// Optional secondary text
    #[arg(long)]
    subtext: Option<String>,

    /// Output thumbnail path
    #[arg(short, long, default_value = "./output/thumbnail.jpg")]
    output: PathBuf,

    /// Thumbnail style
    #[arg(short, long, default_value = "youtube", value_parser = STYLE_NAMES)]
    style: String,

    /// Thumbnail resolution
    #[arg(short, long, default_value = "720p", value_parser = RESOLUTION_NAMES)]
    resolution: String,
}

#[derive(Args)]
struct InfoArgs {
    /// Input video file
    video: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let result = match cli.command {
        Commands::Generate(args) => run_generate(args).await,
        Commands::Analyze(args) => run_analyze(args).await,
        Commands::Compose(args) => run_compose(args),
        Commands::Info(args) => run_info(args),
        Commands::Styles => run_styles(),
    };

    if let Err(e) = result {
        eprintln!("✗ Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = TermLogger::init(
        level,
        LogConfig::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

async fn run_generate(args: GenerateArgs) -> Result<()> {
    // Fail fast on configuration before touching any external tool.
    let config = AppConfig::load()?;
    let resolution = parse_resolution(&args.resolution)?;
    let style = lookup_style(&args.style)?;

    println!("AutoThumb - Thumbnail Generation");
    println!("  Video:      {}", args.video.display());
    println!("  Prompt:     {}", args.prompt);
    println!("  Style:      {}", args.style);
    println!("  Resolution: {}", args.resolution);
    println!("  Frames:     {}", args.frames);
    println!();

    let frames_dir = args
        .output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .join("frames_temp");
    // Removed on every exit path, including failures after sampling.
    let _guard = FramesDirGuard::new(frames_dir.clone());

    let outcome = pipeline::sample_and_analyze(
        &config,
        &args.video,
        &args.prompt,
        args.frames,
        &frames_dir,
        &args.style,
        DEFAULT_MAX_WORDS,
    )
    .await?;

    let target = resolution.for_source(&outcome.metadata);
    if outcome.metadata.is_portrait() {
        println!(
            "Portrait source detected, thumbnail will be {}x{}",
            target.0, target.1
        );
    }

    println!("✓ {} frames analyzed", outcome.frames.len());
    println!("✓ Best frame: #{}", outcome.analysis.best_frame_index + 1);
    println!("✓ Text: \"{}\"", outcome.text.main_text);

    let written = composer::compose(
        &outcome.analysis.best_frame,
        &outcome.text.main_text,
        &args.output,
        outcome.text.subtext.as_deref(),
        target,
        style,
        None,
    )
    .context("failed to compose thumbnail")?;

    println!();
    println!("✓ Thumbnail generated: {}", written.display());
    if !outcome.analysis.reasoning.is_empty() {
        println!(
            "  Reasoning: {}",
            truncate(&outcome.analysis.reasoning, 200)
        );
    }

    Ok(())
}

async fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let config = AppConfig::load()?;

    println!("AutoThumb - Video Analysis");
    println!("  Video:  {}", args.video.display());
    println!("  Prompt: {}", args.prompt);
    println!("  Frames: {}", args.frames);
    println!();

    // The analyze command keeps its frames for inspection; no cleanup guard.
    let outcome = pipeline::sample_and_analyze(
        &config,
        &args.video,
        &args.prompt,
        args.frames,
        &args.output_dir,
        "youtube",
        DEFAULT_MAX_WORDS,
    )
    .await?;

    println!("✓ Analysis complete");
    println!();
    println!("  Best frame:  #{}", outcome.analysis.best_frame_index + 1);
    println!(
        "  Frame file:  {}",
        outcome.analysis.best_frame.display()
    );
    println!("  Main text:   {}", outcome.text.main_text);
    if let Some(subtext) = &outcome.text.subtext {
        println!("  Subtext:     {}", subtext);
    }
    for score in &outcome.analysis.scores {
        println!(
            "  Frame #{:<2} score {}/10 - {}",
            score.index + 1,
            score.score,
            score.suitability
        );
    }
    if !outcome.analysis.reasoning.is_empty() {
        println!();
        println!("  Reasoning: {}", outcome.analysis.reasoning);
    }
    println!();
    println!("Frames saved to: {}", args.output_dir.display());

    Ok(())
}

fn run_compose(args: ComposeArgs) -> Result<()> {
    let resolution = parse_resolution(&args.resolution)?;
    let style = lookup_style(&args.style)?;

    println!("AutoThumb - Thumbnail Composition");
    println!("  Image: {}", args.image.display());
    println!("  Text:  {}", args.text);
    println!("  Style: {}", args.style);
    println!();

    let written = composer::compose(
        &args.image,
        &args.text,
        &args.output,
        args.subtext.as_deref(),
        resolution.dimensions(),
        style,
        None,
    )?;

    println!("✓ Thumbnail created: {}", written.display());
    Ok(())
}

fn run_info(args: InfoArgs) -> Result<()> {
    let metadata = probe::probe(&args.video)?;
    let file_size = fs::metadata(&args.video).map(|m| m.len()).unwrap_or(0);

    println!("Video Information: {}", args.video.display());
    println!(
        "  Duration:   {:.2} seconds ({:.1} minutes)",
        metadata.duration,
        metadata.duration / 60.0
    );
    println!("  Resolution: {}x{}", metadata.width, metadata.height);
    println!("  FPS:        {:.2}", metadata.frame_rate);
    println!("  Codec:      {}", metadata.codec_name);
    println!(
        "  Bitrate:    {:.2} Mbps",
        metadata.bitrate as f64 / 1_000_000.0
    );
    println!("  Size:       {:.2} MB", file_size as f64 / 1_000_000.0);

    Ok(())
}

fn run_styles() -> Result<()> {
    println!("Available Thumbnail Styles");
    println!();
    for style in StylePreset::all() {
        println!("• {}", style.name.to_uppercase());
        println!("  Font size: {}px", style.main_font_size);
        println!("  Position:  {}", style.anchor.as_str());
        println!("  Shadow:    {}", if style.drop_shadow { "yes" } else { "no" });
        println!(
            "  Outline:   {}",
            if style.outline_color.is_some() && style.outline_width > 0 {
                "yes"
            } else {
                "no"
            }
        );
        println!();
    }
    Ok(())
}

fn parse_resolution(name: &str) -> Result<Resolution> {
    Resolution::parse(name).ok_or_else(|| anyhow!("unknown resolution '{}'", name))
}

fn lookup_style(name: &str) -> Result<&'static StylePreset> {
    StylePreset::builtin(name).ok_or_else(|| anyhow!("unknown style '{}'", name))
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
