//! CLI output formatting utilities.

use crate::store::{AnalysisRecord, AnalysisStatus};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print one analysis record.
    pub fn record(record: &AnalysisRecord) {
        let status = match record.url_status {
            AnalysisStatus::Completed => style(record.url_status.as_str()).green(),
            AnalysisStatus::Processing => style(record.url_status.as_str()).yellow(),
            AnalysisStatus::Error => style(record.url_status.as_str()).red(),
        };
        let when = record
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "  {} {} [{}] {}",
            style("*").cyan(),
            style(when).dim(),
            status,
            style(&record.url).bold()
        );

        if let Some(content) = &record.url_content {
            let detail = content
                .error
                .as_deref()
                .or(content.result.as_deref())
                .unwrap_or(&content.message);
            println!("    {}", style(content_preview(detail, 120)).dim());
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed}] {msg}")
                .unwrap(),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// First line of `content`, truncated with ellipsis.
fn content_preview(content: &str, max_chars: usize) -> String {
    let line = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if line.chars().count() <= max_chars {
        line.to_string()
    } else {
        format!("{}...", line.chars().take(max_chars).collect::<String>())
    }
}
