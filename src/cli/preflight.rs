//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::Credentials;
use crate::error::{FactCheckError, Result};
use crate::media::{detect_source, SourceKind};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    /// Video analysis needs the Gemini key and yt-dlp.
    AnalyzeVideo,
    /// Articles only need the Gemini key.
    AnalyzeArticle,
    /// The server accepts any URL, so it needs everything.
    Serve,
}

impl Operation {
    /// Requirements for analyzing `url`.
    pub fn for_url(url: &str) -> Self {
        match detect_source(url) {
            SourceKind::Web => Operation::AnalyzeArticle,
            _ => Operation::AnalyzeVideo,
        }
    }
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, credentials: &Credentials) -> Result<()> {
    check_api_key(credentials)?;
    if operation != Operation::AnalyzeArticle {
        check_tool("yt-dlp")?;
    }
    Ok(())
}

/// Check if the Gemini API key is configured.
fn check_api_key(credentials: &Credentials) -> Result<()> {
    if credentials.gemini_api_key.is_some() {
        Ok(())
    } else {
        Err(FactCheckError::Config(
            "GEMINI_API_KEY not set. Add it to .env or export GEMINI_API_KEY='...'".to_string(),
        ))
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(FactCheckError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(FactCheckError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(FactCheckError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
