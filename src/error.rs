//! Error types for factcheck.

use thiserror::Error;

/// Library-level error type for fact-checking operations.
#[derive(Error, Debug)]
pub enum FactCheckError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Gemini API error: {0}")]
    Gemini(String),

    #[error("Video processing failed")]
    VideoProcessingFailed,

    #[error("Search API error: {0}")]
    Search(String),

    #[error("Media source error: {0}")]
    VideoSource(String),

    #[error("Video download failed: {0}")]
    Download(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Analysis store error: {0}")]
    Store(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Crew error: {0}")]
    Crew(String),
}

/// Result type alias for fact-checking operations.
pub type Result<T> = std::result::Result<T, FactCheckError>;
