//! CLI module for factcheck.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// factcheck - multi-agent fact-checking for videos and articles
///
/// Analyzes a YouTube video, Instagram reel or blog post with Gemini, checks
/// the claims it makes against web sources and writes a Markdown report.
#[derive(Parser, Debug)]
#[command(name = "factcheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level selected by the `-v` count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fact-check a video or article and write the report
    Run {
        /// YouTube/Instagram video URL or blog/article URL (prompted for when omitted)
        url: Option<String>,
    },

    /// Run the crew with a JSON trigger payload, e.g. '{"video_url": "..."}'
    Trigger {
        /// JSON payload
        payload: String,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to $PORT, then 8000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check system requirements, API keys and the Gemini connection
    Doctor,

    /// List recent analyses
    History {
        /// Maximum number of records
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the default configuration file if none exists
    Init,

    /// Show configuration file path
    Path,
}
