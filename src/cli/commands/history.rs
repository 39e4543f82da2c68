//! History command - list recent analyses.

use crate::cli::Output;
use crate::config::{Credentials, Settings};
use crate::store;
use anyhow::Result;

/// Print the most recent analysis records from the configured store.
pub async fn run_history(limit: usize, settings: Settings) -> Result<()> {
    let credentials = Credentials::from_env();

    let Some(store) = store::open(&settings, &credentials)? else {
        Output::warning("Analysis store is disabled (store.provider = \"none\").");
        return Ok(());
    };

    let records = store.recent(limit).await?;

    if records.is_empty() {
        Output::info("No analyses yet.");
        Output::info("Run one with: factcheck run <url>");
        return Ok(());
    }

    Output::header(&format!("Recent analyses ({})", store.backend()));
    println!();
    for record in &records {
        Output::record(record);
    }
    println!();

    Ok(())
}
