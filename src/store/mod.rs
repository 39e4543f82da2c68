//! Persistence of analysis jobs.
//!
//! Each job inserts one record that starts as `processing` and moves to
//! `completed` or `error` when the crew finishes. Updates address the row by
//! the [`RecordId`] returned from the insert, so re-runs and concurrent jobs
//! for the same URL never touch each other's rows. Backends implement
//! [`AnalysisStore`]; [`open`] picks one from configuration.

mod memory;
mod sqlite;
mod supabase;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use supabase::SupabaseStore;

use crate::config::{Credentials, Settings, StoreProvider};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Lifecycle state of an analysis record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Processing,
    Completed,
    Error,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Processing => "processing",
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AnalysisStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "processing" => Ok(AnalysisStatus::Processing),
            "completed" => Ok(AnalysisStatus::Completed),
            "error" => Ok(AnalysisStatus::Error),
            _ => Err(format!("Unknown analysis status: {}", s)),
        }
    }
}

/// Result envelope stored in `url_content` and returned by a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisContent {
    pub success: bool,
    pub message: String,
    pub result: Option<String>,
    pub error: Option<String>,
}

impl AnalysisContent {
    pub fn success(result: impl Into<String>) -> Self {
        Self {
            success: true,
            message: "Video analysis completed successfully".to_string(),
            result: Some(result.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            message: format!("Analysis failed: {}", error),
            result: None,
            error: Some(error),
        }
    }
}

/// Row handle returned by [`AnalysisStore::insert_processing`].
pub type RecordId = i64;

/// One row of the analysis table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub url: String,
    pub url_status: AnalysisStatus,
    #[serde(default)]
    pub url_content: Option<AnalysisContent>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Trait for analysis record backends.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Record that analysis of `url` has started.
    async fn insert_processing(&self, url: &str) -> Result<RecordId>;

    /// Move record `id` to `completed` if it is still `processing`.
    async fn mark_completed(&self, id: RecordId, content: &AnalysisContent) -> Result<()>;

    /// Move record `id` to `error` if it is still `processing`.
    async fn mark_failed(&self, id: RecordId, content: &AnalysisContent) -> Result<()>;

    /// Most recent records, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>>;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}

/// Open the configured store, or `None` when persistence is disabled.
pub fn open(settings: &Settings, credentials: &Credentials) -> Result<Option<Arc<dyn AnalysisStore>>> {
    let supabase = || -> Result<Arc<dyn AnalysisStore>> {
        Ok(Arc::new(SupabaseStore::from_credentials(
            credentials,
            &settings.store.table,
        )?))
    };
    let sqlite = || -> Result<Arc<dyn AnalysisStore>> {
        Ok(Arc::new(SqliteStore::new(&settings.sqlite_path())?))
    };

    let store = match settings.store.provider {
        StoreProvider::None => return Ok(None),
        StoreProvider::Supabase => supabase()?,
        StoreProvider::Sqlite => sqlite()?,
        StoreProvider::Auto if credentials.has_supabase() => supabase()?,
        StoreProvider::Auto => sqlite()?,
    };

    info!("Using {} analysis store", store.backend());
    Ok(Some(store))
}
