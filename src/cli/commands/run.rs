//! Run command - fact-check one URL from the terminal.

use crate::analysis::AnalysisService;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Credentials, Settings};
use anyhow::{bail, Result};
use std::io::{BufRead, Write};

const URL_PROMPT: &str = "Enter URL (YouTube/Instagram video or Blog/Article): ";

/// Run the crew on a URL given as argument or read from stdin.
pub async fn run_analyze(url: Option<String>, settings: Settings) -> Result<()> {
    let url = match url {
        Some(u) => u,
        None => prompt_url(&mut std::io::stdin().lock(), &mut std::io::stdout())?,
    };
    let url = url.trim().to_string();
    if url.is_empty() {
        bail!("No URL provided");
    }

    let credentials = Credentials::from_env();
    preflight::check(Operation::for_url(&url), &credentials)?;

    let service = AnalysisService::from_settings(&settings, &credentials)?;

    Output::info(&format!("Starting fact-check analysis for: {}", url));
    let spinner = Output::spinner("Analyzing content, checking claims and writing the report...");
    let content = service.process(&url).await;
    spinner.finish_and_clear();

    if !content.success {
        bail!(
            "An error occurred while running the crew: {}",
            content.error.unwrap_or_default()
        );
    }

    println!();
    println!("{}", content.result.unwrap_or_default());
    println!();
    Output::success(&format!(
        "Fact-check complete! Report saved to: {}",
        settings.report_path().display()
    ));

    Ok(())
}

/// Ask for a URL on `output` and read one line from `input`.
fn prompt_url<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<String> {
    write!(output, "{}", URL_PROMPT)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_url() {
        let mut input = std::io::Cursor::new("  https://youtu.be/dQw4w9WgXcQ \n");
        let mut output = Vec::new();
        let url = prompt_url(&mut input, &mut output).unwrap();
        assert_eq!(url, "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(String::from_utf8(output).unwrap(), URL_PROMPT);
    }

    #[tokio::test]
    async fn test_empty_url_is_rejected() {
        let err = run_analyze(Some("   ".into()), Settings::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "No URL provided");
    }
}
