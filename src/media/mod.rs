//! Media source detection and video acquisition.
//!
//! Classifies user input (YouTube, Instagram, other web pages, local files)
//! and wraps `yt-dlp` for metadata extraction and downloads.

mod downloader;
mod metadata;

pub use downloader::{download_video, fetch_metadata, DownloadOptions};
pub use metadata::{format_count, truncate_chars, VideoMetadata};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// Kind of content behind a user-supplied URL or path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    YouTube,
    Instagram,
    /// Any other http(s) page: blogs, articles, other video hosts.
    Web,
    Local,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::YouTube => write!(f, "youtube"),
            SourceKind::Instagram => write!(f, "instagram"),
            SourceKind::Web => write!(f, "web"),
            SourceKind::Local => write!(f, "local"),
        }
    }
}

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Matches various YouTube URL formats (including Shorts) and bare video IDs
        Regex::new(
            r"(?x)
            (?:
                (?:https?://)?
                (?:www\.|m\.)?
                (?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/|youtube\.com/shorts/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("Invalid regex")
    })
}

/// Extract the 11-character video ID from a YouTube URL or bare ID.
pub fn youtube_video_id(input: &str) -> Option<String> {
    let caps = video_id_regex().captures(input.trim())?;

    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Whether the input refers to Instagram content.
pub fn is_instagram(input: &str) -> bool {
    input.contains("instagram.com")
}

/// Classify a URL or path.
pub fn detect_source(input: &str) -> SourceKind {
    let input = input.trim();

    if let Ok(parsed) = url::Url::parse(input) {
        if matches!(parsed.scheme(), "http" | "https") {
            let host = parsed.host_str().unwrap_or_default().to_lowercase();
            if host == "youtu.be" || host == "youtube.com" || host.ends_with(".youtube.com") {
                return SourceKind::YouTube;
            }
            if host == "instagram.com" || host.ends_with(".instagram.com") {
                return SourceKind::Instagram;
            }
            return SourceKind::Web;
        }
    }

    if Path::new(input).exists() {
        return SourceKind::Local;
    }

    if youtube_video_id(input).is_some() {
        return SourceKind::YouTube;
    }

    if is_instagram(input) {
        return SourceKind::Instagram;
    }

    SourceKind::Web
}

/// Canonical watch URL for a YouTube input, or the input unchanged.
pub fn normalize_youtube_url(input: &str) -> String {
    match youtube_video_id(input) {
        Some(id) if !input.contains("/shorts/") => format!("https://www.youtube.com/watch?v={}", id),
        _ => input.trim().to_string(),
    }
}
