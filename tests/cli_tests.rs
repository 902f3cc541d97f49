//! Binary-level tests for the autothumb CLI
//! None of these require ffmpeg or network access.

use assert_cmd::Command;
use predicates::prelude::*;

fn autothumb() -> Command {
    Command::cargo_bin("autothumb").expect("binary builds")
}

#[test]
fn styles_lists_all_presets() {
    autothumb()
        .arg("styles")
        .assert()
        .success()
        .stdout(predicate::str::contains("YOUTUBE"))
        .stdout(predicate::str::contains("MINIMALIST"))
        .stdout(predicate::str::contains("BOLD"))
        .stdout(predicate::str::contains("TECH"));
}

#[test]
fn info_missing_file_fails() {
    autothumb()
        .args(["info", "/nonexistent/video.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn compose_missing_image_fails() {
    autothumb()
        .args(["compose", "/nonexistent/frame.jpg", "--text", "HELLO"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn compose_rejects_unknown_style() {
    autothumb()
        .args([
            "compose",
            "/nonexistent/frame.jpg",
            "--text",
            "HELLO",
            "--style",
            "vaporwave",
        ])
        .assert()
        .failure();
}

#[test]
fn generate_requires_prompt() {
    autothumb()
        .args(["generate", "video.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--prompt"));
}

#[test]
fn generate_without_api_key_is_a_config_error() {
    autothumb()
        .env_remove("ANTHROPIC_API_KEY")
        .args(["generate", "video.mp4", "--prompt", "a rust tutorial"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ANTHROPIC_API_KEY"));
}

#[test]
fn generate_missing_video_fails_before_any_network_call() {
    autothumb()
        .env("ANTHROPIC_API_KEY", "test-key")
        .args([
            "generate",
            "/nonexistent/video.mp4",
            "--prompt",
            "a rust tutorial",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn compose_writes_thumbnail_at_requested_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("frame.jpg");
    let output = dir.path().join("thumb.jpg");

    let base = image::RgbImage::from_pixel(64, 48, image::Rgb([120, 60, 30]));
    base.save(&input).unwrap();

    autothumb()
        .args([
            "compose",
            input.to_str().unwrap(),
            "--text",
            "PYTHON TIPS",
            "--subtext",
            "2024",
            "--style",
            "bold",
            "--resolution",
            "1080p",
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Thumbnail created"));

    let thumb = image::open(&output).unwrap();
    assert_eq!(thumb.width(), 1920);
    assert_eq!(thumb.height(), 1080);
}

#[test]
fn compose_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("frame.jpg");
    let output = dir.path().join("deeply/nested/thumb.jpg");

    let base = image::RgbImage::from_pixel(32, 18, image::Rgb([10, 200, 90]));
    base.save(&input).unwrap();

    autothumb()
        .args([
            "compose",
            input.to_str().unwrap(),
            "--text",
            "HELLO",
            "--style",
            "minimalist",
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert!(output.exists());
}
