//! factcheck - multi-agent fact-checking for videos and articles
//!
//! Takes a YouTube video, Instagram reel or blog post, has Gemini describe
//! what it shows and says, verifies the claims against web search results
//! and writes a Markdown fact-check report.
//!
//! # Architecture
//!
//! - `config` - Settings, credentials and prompt templates
//! - `media` - URL classification, yt-dlp metadata and downloads
//! - `gemini` - Gemini Files/generateContent client and the chat client for agents
//! - `tools` - The tools agents can call (video, article, search, fact-check)
//! - `agent` - Role-scoped LLM agents with a tool-calling loop
//! - `crew` - The fixed three-step sequential pipeline
//! - `store` - Analysis records (Supabase, SQLite, in-memory)
//! - `analysis` - One analysis job: record, run the crew, record the outcome
//!
//! # Example
//!
//! ```rust,no_run
//! use factcheck::analysis::AnalysisService;
//! use factcheck::config::{Credentials, Settings};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let service = AnalysisService::from_settings(&settings, &Credentials::from_env())?;
//!
//!     let content = service.process("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await;
//!     println!("{}", content.result.unwrap_or(content.message));
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod crew;
pub mod error;
pub mod gemini;
pub mod media;
pub mod store;
pub mod tools;

pub use error::{FactCheckError, Result};
