//! Turning tool failures into messages an agent can act on.

/// Broad category of a failure, decided from its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// API quota or rate limit exhausted.
    Quota,
    /// Content refused by safety filters, or private/age-restricted.
    Blocked,
    /// The media could not be fetched.
    Download,
    Other,
}

/// Classify an error message by the substrings it contains (case-insensitive).
pub fn classify(message: &str) -> FailureKind {
    let lower = message.to_lowercase();
    if lower.contains("quota") {
        FailureKind::Quota
    } else if lower.contains("blocked") || lower.contains("safety") {
        FailureKind::Blocked
    } else if lower.contains("download") {
        FailureKind::Download
    } else {
        FailureKind::Other
    }
}

/// Troubleshooting message for a failed YouTube analysis.
pub fn youtube_failure_message(url: &str, error: &str) -> String {
    match classify(error) {
        FailureKind::Quota => format!(
            "Error: API quota exceeded.\n\n\
             Please check your Gemini API quota at: https://aistudio.google.com/\n\n\
             URL provided: {url}\n\
             Error: {error}"
        ),
        FailureKind::Blocked => format!(
            "Error: Content may have been blocked by safety filters.\n\n\
             This can happen with:\n\
             - Age-restricted content\n\
             - Potentially harmful content\n\
             - Private videos\n\n\
             URL provided: {url}\n\
             Error: {error}"
        ),
        FailureKind::Download => format!(
            "Error downloading video: {error}\n\n\
             URL provided: {url}\n\n\
             Troubleshooting:\n\
             1. Ensure the video is public\n\
             2. Check if the URL is correct\n\
             3. Try a different video"
        ),
        FailureKind::Other => format!(
            "Error analyzing YouTube video: {error}\n\n\
             URL provided: {url}\n\n\
             Troubleshooting:\n\
             1. Ensure the video is public\n\
             2. Check if the URL is correct\n\
             3. Try a different video\n\
             4. Verify your API key is valid"
        ),
    }
}
