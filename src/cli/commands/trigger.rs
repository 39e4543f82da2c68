//! Trigger command - run the crew from a JSON payload.

use crate::cli::Output;
use crate::config::{Credentials, Prompts, Settings};
use crate::crew::Crew;
use anyhow::{anyhow, Result};
use std::collections::HashMap;

/// Crew inputs from a trigger payload. The raw payload is passed along as
/// `trigger_payload` next to `video_url`.
pub fn trigger_inputs(payload: &str) -> Result<HashMap<String, String>> {
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|_| anyhow!("Invalid JSON payload provided as argument"))?;

    let video_url = value
        .get("video_url")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    Ok(HashMap::from([
        ("trigger_payload".to_string(), value.to_string()),
        ("video_url".to_string(), video_url),
    ]))
}

/// Run the crew with inputs taken from a trigger payload.
pub async fn run_trigger(payload: &str, settings: Settings) -> Result<()> {
    let inputs = trigger_inputs(payload)?;

    let credentials = Credentials::from_env();
    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let crew = Crew::fact_check(&settings, prompts, &credentials)?;

    let spinner = Output::spinner("Running crew...");
    let result = crew.kickoff(&inputs).await;
    spinner.finish_and_clear();

    let output = result.map_err(|e| anyhow!("An error occurred while running the crew with trigger: {}", e))?;
    println!("{}", output);
    Ok(())
}
