//! Configuration module for factcheck.
//!
//! Handles loading application settings, environment credentials and prompt templates.

mod prompts;
mod settings;

pub use prompts::{
    AgentPersona, AgentPrompts, AnalysisPrompts, Prompts, TaskPrompt, TaskPrompts,
};
pub use settings::{
    AgentSettings, Credentials, GeminiSettings, GeneralSettings, PromptSettings,
    SearchSettings, ServerSettings, Settings, StoreProvider, StoreSettings,
};
