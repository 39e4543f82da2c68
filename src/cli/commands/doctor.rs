//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{Credentials, Prompts, Settings};
use crate::crew::Crew;
use crate::gemini::GeminiClient;
use console::style;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks. `config_path` is the `-c` override, if any.
pub async fn run_doctor(settings: &Settings, config_path: Option<&PathBuf>) -> anyhow::Result<()> {
    Output::header("Video Fact-Checker Doctor");
    println!();
    println!("Checking environment, tools and API access...\n");

    let credentials = Credentials::from_env();
    let mut sections: Vec<(&str, Vec<CheckResult>)> = Vec::new();

    sections.push(("Environment", check_environment(&credentials, settings)));
    sections.push((
        "External Tools",
        vec![check_tool("yt-dlp", "yt-dlp --version", install_hint_ytdlp())],
    ));
    let config_path = config_path.cloned().unwrap_or_else(Settings::default_config_path);
    sections.push(("Configuration", check_config(settings, &config_path)));
    sections.push(("Crew", vec![check_crew(settings, &credentials)]));

    let gemini_check = match &credentials.gemini_api_key {
        Some(key) => check_gemini(settings, key).await,
        None => CheckResult::warning("Gemini API", "skipped", "No valid GEMINI_API_KEY to test with"),
    };
    sections.push(("Gemini API", vec![gemini_check]));

    for (title, checks) in &sections {
        println!("{}", style(title).bold());
        for check in checks {
            check.print();
        }
        println!();
    }

    // Summary
    println!("{}", style("Summary").bold());
    for (title, checks) in &sections {
        let passed = checks.iter().all(|c| c.status != CheckStatus::Error);
        let status = if passed {
            style("PASS").green()
        } else {
            style("FAIL").red()
        };
        println!("  {:20} {}", title, status);
    }
    println!();

    let all: Vec<&CheckResult> = sections.iter().flat_map(|(_, c)| c.iter()).collect();
    let errors = all.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = all.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before running a fact-check.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Run your first fact-check with: factcheck run <url>");
    }

    Ok(())
}

/// Check API keys and model configuration.
fn check_environment(credentials: &Credentials, settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    results.push(match &credentials.gemini_api_key {
        Some(key) => CheckResult::ok("GEMINI_API_KEY", &format!("configured ({})", mask(key))),
        None => CheckResult::error(
            "GEMINI_API_KEY",
            "not configured",
            "Add GEMINI_API_KEY to .env (get one at https://aistudio.google.com/apikey)",
        ),
    });

    results.push(match &credentials.serper_api_key {
        Some(key) => CheckResult::ok("SERPER_API_KEY", &format!("configured ({})", mask(key))),
        None => CheckResult::warning(
            "SERPER_API_KEY",
            "not configured (optional but recommended)",
            "Without it the fact checker cannot search the web",
        ),
    });

    let model = settings.agent_model(credentials);
    results.push(match &credentials.model {
        Some(_) => CheckResult::ok("MODEL", &model),
        None => CheckResult::ok("MODEL", &format!("{} (default)", model)),
    });

    results.push(if credentials.has_supabase() {
        CheckResult::ok("Supabase", "configured")
    } else {
        CheckResult::warning(
            "Supabase",
            "not configured",
            "Set SUPABASE_URL and SUPABASE_ANON_KEY to store results remotely",
        )
    });

    results
}

/// Show the first and last few characters of a secret.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Check if an external tool is available.
fn check_tool(name: &str, version_cmd: &str, hint: &str) -> CheckResult {
    let parts: Vec<&str> = version_cmd.split_whitespace().collect();
    let cmd = parts[0];
    let args = &parts[1..];

    match Command::new(cmd).args(args).output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();
            CheckResult::ok(name, &version)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Check config file and prompt overrides.
fn check_config(settings: &Settings, config_path: &Path) -> Vec<CheckResult> {
    let mut results = Vec::new();

    results.push(if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: factcheck config init",
        )
    });

    results.push(
        match Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        ) {
            Ok(_) => CheckResult::ok("Prompts", "loaded"),
            Err(e) => CheckResult::error("Prompts", &e.to_string(), "Fix the TOML in your custom prompts directory"),
        },
    );

    results.push(CheckResult::ok(
        "Report path",
        &format!("{}", settings.report_path().display()),
    ));

    results
}

/// Check that the crew can be assembled.
fn check_crew(settings: &Settings, credentials: &Credentials) -> CheckResult {
    let prompts = match Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    ) {
        Ok(p) => p,
        Err(e) => return CheckResult::error("Crew", &e.to_string(), "Fix the prompt files first"),
    };

    match Crew::fact_check(settings, prompts, credentials) {
        Ok(crew) => CheckResult::ok(
            "Crew",
            &format!("initialized with {} tasks", crew.tasks().len()),
        ),
        Err(e) => CheckResult::error("Crew", &e.to_string(), "Check the configuration above"),
    }
}

/// Round trip to Gemini with a trivial prompt.
async fn check_gemini(settings: &Settings, api_key: &str) -> CheckResult {
    let client = match GeminiClient::new(&settings.gemini, api_key) {
        Ok(c) => c,
        Err(e) => return CheckResult::error("Gemini API", &e.to_string(), "Check the [gemini] settings"),
    };

    match client.generate(None, "Say 'API test successful'").await {
        Ok(text) if !text.trim().is_empty() => {
            CheckResult::ok("Gemini API", &format!("connection successful ({})", client.model()))
        }
        Ok(_) => CheckResult::error("Gemini API", "returned an empty response", "Try again later"),
        Err(e) => CheckResult::error(
            "Gemini API",
            &e.to_string(),
            "Verify GEMINI_API_KEY and your quota",
        ),
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}
