//! Configuration settings for factcheck.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder value shipped in example `.env` files.
const GEMINI_KEY_PLACEHOLDER: &str = "your_gemini_api_key_here";
const SERPER_KEY_PLACEHOLDER: &str = "your_serper_api_key_here";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub gemini: GeminiSettings,
    pub search: SearchSettings,
    pub agents: AgentSettings,
    pub store: StoreSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Directory for temporary downloads.
    pub temp_dir: String,
    /// Where the final Markdown report is written.
    pub report_path: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.factcheck".to_string(),
            temp_dir: std::env::temp_dir().to_string_lossy().into_owned(),
            report_path: "fact_check_report.md".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Gemini API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    /// Base URL of the native Gemini REST API.
    pub api_base: String,
    /// Base URL of Gemini's OpenAI-compatible endpoint (used by agents).
    pub openai_base: String,
    /// Model used for video understanding.
    pub video_model: String,
    /// Seconds between file state polls while Gemini processes an upload.
    pub poll_interval_secs: u64,
    /// Timeout for a single API request.
    pub request_timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com".to_string(),
            openai_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            video_model: "gemini-2.5-flash".to_string(),
            poll_interval_secs: 2,
            request_timeout_secs: 300,
        }
    }
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Base URL of the Serper API.
    pub api_base: String,
    /// Number of organic results to request.
    pub num_results: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_base: "https://google.serper.dev".to_string(),
            num_results: 10,
        }
    }
}

/// Agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Chat model for all agents. `MODEL` in the environment takes precedence.
    pub model: String,
    /// Maximum LLM calls per task.
    pub max_iterations: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            max_iterations: 15,
        }
    }
}

/// Analysis store backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreProvider {
    /// Supabase when credentials are present, otherwise SQLite.
    #[default]
    Auto,
    Supabase,
    Sqlite,
    None,
}

impl std::str::FromStr for StoreProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(StoreProvider::Auto),
            "supabase" => Ok(StoreProvider::Supabase),
            "sqlite" | "local" => Ok(StoreProvider::Sqlite),
            "none" | "off" => Ok(StoreProvider::None),
            _ => Err(format!("Unknown store provider: {}", s)),
        }
    }
}

impl std::fmt::Display for StoreProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreProvider::Auto => write!(f, "auto"),
            StoreProvider::Supabase => write!(f, "supabase"),
            StoreProvider::Sqlite => write!(f, "sqlite"),
            StoreProvider::None => write!(f, "none"),
        }
    }
}

/// Analysis store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub provider: StoreProvider,
    /// Supabase table holding analysis records.
    pub table: String,
    /// Path to the local SQLite history database.
    pub sqlite_path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            provider: StoreProvider::Auto,
            table: "video_analysis".to_string(),
            sqlite_path: "~/.factcheck/history.db".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    /// Port to bind. `PORT` in the environment takes precedence.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

/// Secrets and deployment overrides read from the environment.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub gemini_api_key: Option<String>,
    pub serper_api_key: Option<String>,
    /// Chat model override (`MODEL`), provider prefix stripped.
    pub model: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub port: Option<u16>,
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            gemini_api_key: non_empty("GEMINI_API_KEY")
                .filter(|k| k != GEMINI_KEY_PLACEHOLDER),
            serper_api_key: non_empty("SERPER_API_KEY")
                .filter(|k| k != SERPER_KEY_PLACEHOLDER),
            model: non_empty("MODEL").map(|m| strip_provider_prefix(&m).to_string()),
            supabase_url: non_empty("SUPABASE_URL"),
            supabase_key: non_empty("SUPABASE_ANON_KEY")
                .or_else(|| non_empty("SUPABASE_SERVICE_KEY")),
            port: non_empty("PORT").and_then(|p| p.parse().ok()),
        }
    }

    /// Whether both Supabase URL and key are available.
    pub fn has_supabase(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_key.is_some()
    }
}

/// `gemini/gemini-2.5-flash` -> `gemini-2.5-flash`.
fn strip_provider_prefix(model: &str) -> &str {
    model.split_once('/').map(|(_, m)| m).unwrap_or(model)
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::FactCheckError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("factcheck")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Get the expanded report path.
    pub fn report_path(&self) -> PathBuf {
        Self::expand_path(&self.general.report_path)
    }

    /// Get the expanded SQLite history path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.store.sqlite_path)
    }

    /// Chat model for agents, honoring the `MODEL` override.
    pub fn agent_model(&self, credentials: &Credentials) -> String {
        credentials
            .model
            .clone()
            .unwrap_or_else(|| self.agents.model.clone())
    }

    /// Port for the HTTP server, honoring the `PORT` override.
    pub fn server_port(&self, credentials: &Credentials) -> u16 {
        credentials.port.unwrap_or(self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_placeholder_key_is_missing() {
        let creds = Credentials::from_lookup(lookup(&[("GEMINI_API_KEY", "your_gemini_api_key_here")]));
        assert!(creds.gemini_api_key.is_none());

        let creds = Credentials::from_lookup(lookup(&[("GEMINI_API_KEY", "AIza-real")]));
        assert_eq!(creds.gemini_api_key.as_deref(), Some("AIza-real"));
    }

    #[test]
    fn test_model_prefix_stripped() {
        let creds = Credentials::from_lookup(lookup(&[("MODEL", "gemini/gemini-2.0-flash")]));
        assert_eq!(creds.model.as_deref(), Some("gemini-2.0-flash"));

        let settings = Settings::default();
        assert_eq!(settings.agent_model(&creds), "gemini-2.0-flash");
        assert_eq!(settings.agent_model(&Credentials::default()), "gemini-2.5-flash");
    }

    #[test]
    fn test_supabase_key_fallback() {
        let creds = Credentials::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://x.supabase.co"),
            ("SUPABASE_SERVICE_KEY", "service"),
        ]));
        assert!(creds.has_supabase());
        assert_eq!(creds.supabase_key.as_deref(), Some("service"));

        let creds = Credentials::from_lookup(lookup(&[("SUPABASE_URL", "https://x.supabase.co")]));
        assert!(!creds.has_supabase());
    }

    #[test]
    fn test_port_override() {
        let settings = Settings::default();
        let creds = Credentials::from_lookup(lookup(&[("PORT", "9090")]));
        assert_eq!(settings.server_port(&creds), 9090);

        let creds = Credentials::from_lookup(lookup(&[("PORT", "not-a-port")]));
        assert_eq!(settings.server_port(&creds), 8000);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [store]
            provider = "sqlite"

            [agents]
            max_iterations = 5
            "#,
        )
        .unwrap();
        assert_eq!(settings.store.provider, StoreProvider::Sqlite);
        assert_eq!(settings.store.table, "video_analysis");
        assert_eq!(settings.agents.max_iterations, 5);
        assert_eq!(settings.general.report_path, "fact_check_report.md");
    }

    #[test]
    fn test_store_provider_from_str() {
        assert_eq!("local".parse::<StoreProvider>(), Ok(StoreProvider::Sqlite));
        assert_eq!("SUPABASE".parse::<StoreProvider>(), Ok(StoreProvider::Supabase));
        assert!("redis".parse::<StoreProvider>().is_err());
    }
}
