//! Gemini API clients.
//!
//! Agents talk to Gemini through its OpenAI-compatible chat endpoint so the
//! tool-calling loop can use `async-openai`. Video understanding needs the
//! native Files and `generateContent` APIs, which live in [`GeminiClient`].

mod native;

pub use native::{FileState, GeminiClient, GeminiFile};

use crate::config::GeminiSettings;
use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create a chat client for Gemini's OpenAI-compatible endpoint.
///
/// Uses the configured request timeout to prevent hung API calls.
pub fn create_chat_client(settings: &GeminiSettings, api_key: &str) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .build()?;

    let config = OpenAIConfig::new()
        .with_api_base(settings.openai_base.trim_end_matches('/'))
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}
