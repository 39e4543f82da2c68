//! Video report formatting and prompt variables.

use crate::media::{format_count, VideoMetadata};
use std::collections::HashMap;

/// Template variables for the Instagram analysis prompt.
pub fn instagram_prompt_vars(meta: &VideoMetadata) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert("author".to_string(), meta.uploader.clone());
    vars.insert("title".to_string(), meta.title.clone());
    vars.insert("description".to_string(), meta.description_preview(500, false));
    vars.insert("upload_date".to_string(), meta.upload_date.clone());
    vars.insert("views".to_string(), format_count(meta.view_count));
    vars
}

/// Template variables for the YouTube analysis prompt.
pub fn youtube_prompt_vars(meta: &VideoMetadata) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert("title".to_string(), meta.title.clone());
    vars.insert("channel".to_string(), meta.uploader.clone());
    vars.insert("description".to_string(), meta.description_preview(500, true));
    vars.insert("upload_date".to_string(), meta.upload_date.clone());
    vars.insert("views".to_string(), format_count(meta.view_count));
    vars.insert("duration".to_string(), meta.duration_seconds.to_string());
    vars.insert("tags".to_string(), meta.tags_preview(10));
    vars
}

/// Wrap a Gemini analysis of an Instagram reel with its metadata.
pub fn format_instagram_report(meta: &VideoMetadata, analysis: &str) -> String {
    format!(
        "\nINSTAGRAM VIDEO ANALYSIS\n\
         ========================\n\n\
         VIDEO METADATA:\n\
         - Author: {}\n\
         - Title/Caption: {}\n\
         - Upload Date: {}\n\
         - Views: {}\n\
         - Likes: {}\n\n\
         DESCRIPTION/CAPTION:\n\
         {}\n\n\
         ---\n\n\
         DETAILED VIDEO ANALYSIS:\n\
         {}\n",
        meta.uploader,
        meta.title,
        meta.upload_date,
        format_count(meta.view_count),
        format_count(meta.like_count),
        meta.description_preview(500, false),
        analysis
    )
}

/// Wrap a Gemini analysis of a YouTube video with its metadata.
pub fn format_youtube_report(url: &str, meta: &VideoMetadata, analysis: &str) -> String {
    format!(
        "\nYOUTUBE VIDEO ANALYSIS\n\
         ======================\n\n\
         VIDEO METADATA:\n\
         - URL: {url}\n\
         - Title: {}\n\
         - Channel: {}\n\
         - Upload Date: {}\n\
         - Views: {}\n\
         - Likes: {}\n\
         - Duration: {} seconds\n\n\
         DESCRIPTION:\n\
         {}\n\n\
         TAGS: {}\n\n\
         ---\n\n\
         DETAILED VIDEO ANALYSIS:\n\
         {}\n",
        meta.title,
        meta.uploader,
        meta.upload_date,
        format_count(meta.view_count),
        format_count(meta.like_count),
        meta.duration_seconds,
        meta.description_preview(1000, true),
        meta.tags_preview(15),
        analysis
    )
}
