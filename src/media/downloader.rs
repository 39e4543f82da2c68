//! Video download and metadata extraction via yt-dlp.

use super::VideoMetadata;
use crate::error::{FactCheckError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mkv", "mov", "m4v", "3gp"];

/// Options for a yt-dlp download.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// yt-dlp format selector.
    pub format: String,
    /// Output filename template, relative to the output directory.
    pub output_template: String,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            format: "best[ext=mp4]/best".to_string(),
            output_template: "%(title)s.%(ext)s".to_string(),
        }
    }
}

impl DownloadOptions {
    /// Capped at 720p and named by video ID, to keep uploads small.
    pub fn compact() -> Self {
        Self {
            format: "best[ext=mp4][height<=720]/best[ext=mp4]/best".to_string(),
            output_template: "%(id)s.%(ext)s".to_string(),
        }
    }
}

/// Fetch metadata for a URL without downloading the media.
#[instrument]
pub async fn fetch_metadata(url: &str, default_title: &str) -> Result<VideoMetadata> {
    info!("Extracting metadata");

    let output = Command::new("yt-dlp")
        .args([
            "--dump-json",
            "--skip-download",
            "--no-playlist",
            "--no-warnings",
            url,
        ])
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FactCheckError::ToolNotFound("yt-dlp".to_string())
            } else {
                FactCheckError::VideoSource(format!("Failed to run yt-dlp: {}", e))
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FactCheckError::VideoSource(format!(
            "Metadata extraction failed for {}: {}",
            url,
            stderr.trim()
        )));
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&json_str).map_err(|e| {
        FactCheckError::VideoSource(format!("Failed to parse yt-dlp output: {}", e))
    })?;

    Ok(VideoMetadata::from_ytdlp_json(&json, default_title))
}

/// Download a video into `output_dir` and return the final file path.
#[instrument(skip(options), fields(dir = %output_dir.display()))]
pub async fn download_video(url: &str, output_dir: &Path, options: &DownloadOptions) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    info!("Downloading video");

    let template = output_dir.join(&options.output_template);

    let result = Command::new("yt-dlp")
        .arg("--format").arg(&options.format)
        .arg("--output").arg(&template)
        .arg("--no-playlist")
        .arg("--no-warnings")
        .arg("--print").arg("after_move:filepath")
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(FactCheckError::ToolNotFound("yt-dlp".into()));
        }
        Err(e) => {
            return Err(FactCheckError::Download(format!("yt-dlp execution failed: {e}")));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FactCheckError::Download(format!("yt-dlp failed: {}", stderr.trim())));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if let Some(printed) = stdout.lines().map(str::trim).rfind(|l| !l.is_empty()) {
        let path = PathBuf::from(printed);
        if path.exists() {
            debug!("yt-dlp reported {}", path.display());
            return Ok(path);
        }
    }

    find_video_file(output_dir)
}

/// Locate a downloaded video in a directory.
fn find_video_file(dir: &Path) -> Result<PathBuf> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| FactCheckError::Download(format!("Cannot read directory: {e}")))?;

    let mut fallback = None;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            return Ok(path);
        }
        // Partial downloads are never a valid result
        if ext != "part" && ext != "ytdl" {
            fallback.get_or_insert(path);
        }
    }

    fallback.ok_or_else(|| FactCheckError::Download("Video file not found after download".into()))
}
