//! Video metadata as reported by yt-dlp.

use serde::{Deserialize, Serialize};

/// Metadata about an online video.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Uploader or channel name.
    pub uploader: String,
    pub channel_id: String,
    /// Upload date as yt-dlp reports it (`YYYYMMDD`).
    pub upload_date: String,
    pub view_count: u64,
    pub like_count: u64,
    pub duration_seconds: u64,
    pub tags: Vec<String>,
}

impl VideoMetadata {
    /// Build metadata from a `yt-dlp --dump-json` document.
    ///
    /// Missing fields get the same placeholders the reports use ("Unknown",
    /// "No description", zero counts).
    pub fn from_ytdlp_json(json: &serde_json::Value, default_title: &str) -> Self {
        let text = |key: &str, fallback: &str| {
            json[key]
                .as_str()
                .filter(|s| !s.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };
        let count = |key: &str| {
            json[key]
                .as_u64()
                .or_else(|| json[key].as_f64().map(|f| f as u64))
                .unwrap_or(0)
        };

        let uploader = json["uploader"]
            .as_str()
            .or_else(|| json["channel"].as_str())
            .unwrap_or("Unknown")
            .to_string();

        let tags = json["tags"]
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|t| t.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: text("id", ""),
            title: text("title", default_title),
            description: text("description", "No description"),
            uploader,
            channel_id: text("channel_id", "Unknown"),
            upload_date: text("upload_date", "Unknown"),
            view_count: count("view_count"),
            like_count: count("like_count"),
            duration_seconds: count("duration"),
            tags,
        }
    }

    /// Placeholder used when Instagram metadata cannot be extracted.
    pub fn instagram_fallback() -> Self {
        Self {
            id: String::new(),
            title: "Instagram Post".to_string(),
            description: "Could not extract metadata".to_string(),
            uploader: "Unknown".to_string(),
            channel_id: "Unknown".to_string(),
            upload_date: "Unknown".to_string(),
            view_count: 0,
            like_count: 0,
            duration_seconds: 0,
            tags: Vec::new(),
        }
    }

    /// Description cut to `max_chars`, with `...` appended when cut.
    pub fn description_preview(&self, max_chars: usize, ellipsis: bool) -> String {
        truncate_chars(&self.description, max_chars, if ellipsis { "..." } else { "" })
    }

    /// First `max` tags joined by commas, or `None`.
    pub fn tags_preview(&self, max: usize) -> String {
        if self.tags.is_empty() {
            "None".to_string()
        } else {
            self.tags.iter().take(max).cloned().collect::<Vec<_>>().join(", ")
        }
    }
}

/// Truncate on a character boundary, appending `suffix` when anything was cut.
pub fn truncate_chars(s: &str, max_chars: usize, suffix: &str) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}{}", &s[..idx], suffix),
        None => s.to_string(),
    }
}

/// Format an integer with thousands separators (`12345` -> `12,345`).
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_ytdlp_json() {
        let meta = VideoMetadata::from_ytdlp_json(
            &json!({
                "id": "dQw4w9WgXcQ",
                "title": "Never Gonna Give You Up",
                "uploader": "Rick Astley",
                "upload_date": "20091025",
                "view_count": 1500000000u64,
                "like_count": 17000000,
                "duration": 212.0,
                "tags": ["music", "80s"]
            }),
            "Unknown",
        );
        assert_eq!(meta.uploader, "Rick Astley");
        assert_eq!(meta.description, "No description");
        assert_eq!(meta.duration_seconds, 212);
        assert_eq!(meta.tags, vec!["music", "80s"]);
        assert_eq!(meta.channel_id, "Unknown");
    }

    #[test]
    fn test_missing_title_uses_default() {
        let meta = VideoMetadata::from_ytdlp_json(&json!({}), "Instagram Post");
        assert_eq!(meta.title, "Instagram Post");
        assert_eq!(meta.view_count, 0);
        assert_eq!(meta.tags_preview(10), "None");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10, "..."), "hello");
        assert_eq!(truncate_chars("hello world", 5, "..."), "hello...");
        assert_eq!(truncate_chars("héllo", 2, ""), "hé");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }
}
