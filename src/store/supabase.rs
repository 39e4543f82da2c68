//! Supabase (PostgREST) analysis store.

use super::{AnalysisContent, AnalysisRecord, AnalysisStatus, AnalysisStore, RecordId};
use crate::config::Credentials;
use crate::error::{FactCheckError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Deserialize)]
struct InsertedRow {
    id: RecordId,
}

/// Analysis records in a Supabase table, accessed over its REST API.
pub struct SupabaseStore {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl SupabaseStore {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            api_key: api_key.to_string(),
        })
    }

    /// Create a store from `SUPABASE_URL` and `SUPABASE_ANON_KEY`/`SUPABASE_SERVICE_KEY`.
    pub fn from_credentials(credentials: &Credentials, table: &str) -> Result<Self> {
        match (&credentials.supabase_url, &credentials.supabase_key) {
            (Some(url), Some(key)) => Self::new(url, key, table),
            _ => Err(FactCheckError::Config(
                "SUPABASE_URL and SUPABASE_ANON_KEY (or SUPABASE_SERVICE_KEY) must be set".to_string(),
            )),
        }
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.http
            .request(method, &self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FactCheckError::Store(format!(
                "Supabase returned HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }
        Ok(response)
    }

    /// Finish a `processing` row. Rows already finished are left alone.
    async fn finish(&self, id: RecordId, status: AnalysisStatus, content: &AnalysisContent) -> Result<()> {
        let builder = self
            .request(reqwest::Method::PATCH)
            .query(&[
                ("id", format!("eq.{}", id)),
                ("url_status", "eq.processing".to_string()),
            ])
            .header("Prefer", "return=minimal")
            .json(&json!({ "url_status": status, "url_content": content }));
        self.send(builder).await?;
        Ok(())
    }
}

#[async_trait]
impl AnalysisStore for SupabaseStore {
    #[instrument(skip(self))]
    async fn insert_processing(&self, url: &str) -> Result<RecordId> {
        let builder = self
            .request(reqwest::Method::POST)
            .header("Prefer", "return=representation")
            .json(&json!({ "url": url, "url_status": AnalysisStatus::Processing }));
        let rows: Vec<InsertedRow> = self.send(builder).await?.json().await?;
        let id = rows
            .first()
            .map(|row| row.id)
            .ok_or_else(|| FactCheckError::Store("Supabase insert returned no rows".to_string()))?;
        debug!("Inserted processing record {}", id);
        Ok(id)
    }

    #[instrument(skip(self, content))]
    async fn mark_completed(&self, id: RecordId, content: &AnalysisContent) -> Result<()> {
        self.finish(id, AnalysisStatus::Completed, content).await
    }

    #[instrument(skip(self, content))]
    async fn mark_failed(&self, id: RecordId, content: &AnalysisContent) -> Result<()> {
        self.finish(id, AnalysisStatus::Error, content).await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>> {
        let builder = self.request(reqwest::Method::GET).query(&[
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
            ("limit", limit.to_string()),
        ]);
        let records = self.send(builder).await?.json().await?;
        Ok(records)
    }

    fn backend(&self) -> &'static str {
        "supabase"
    }
}
