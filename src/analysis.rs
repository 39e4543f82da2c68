//! One analysis job: record, run the crew, record the outcome.

use crate::config::{Credentials, Prompts, Settings};
use crate::crew::{inputs_for, Crew};
use crate::error::Result;
use crate::store::{self, AnalysisContent, AnalysisStatus, AnalysisStore, RecordId};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Something that turns a URL into a fact-check report.
#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn run(&self, url: &str) -> Result<String>;
}

#[async_trait]
impl Pipeline for Crew {
    async fn run(&self, url: &str) -> Result<String> {
        Ok(self.kickoff(&inputs_for(url)).await?.raw)
    }
}

/// Runs analysis jobs and keeps the store in step with them.
#[derive(Clone)]
pub struct AnalysisService {
    pipeline: Arc<dyn Pipeline>,
    store: Option<Arc<dyn AnalysisStore>>,
}

impl AnalysisService {
    pub fn new(pipeline: Arc<dyn Pipeline>, store: Option<Arc<dyn AnalysisStore>>) -> Self {
        Self { pipeline, store }
    }

    /// Build the service from configuration: the fact-check crew plus the configured store.
    pub fn from_settings(settings: &Settings, credentials: &Credentials) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let crew = Crew::fact_check(settings, prompts, credentials)?;
        let store = store::open(settings, credentials)?;
        Ok(Self::new(Arc::new(crew), store))
    }

    pub fn store(&self) -> Option<&Arc<dyn AnalysisStore>> {
        self.store.as_ref()
    }

    /// Analyze `url` and return the result envelope. Never fails.
    #[instrument(skip(self), fields(job = %uuid::Uuid::new_v4()))]
    pub async fn process(&self, url: &str) -> AnalysisContent {
        info!("Starting analysis of {}", url);

        let record = self.record_start(url).await;

        let (status, content) = match self.pipeline.run(url).await {
            Ok(report) => {
                info!("Analysis of {} completed", url);
                (AnalysisStatus::Completed, AnalysisContent::success(report))
            }
            Err(e) => {
                error!("Analysis of {} failed: {}", url, e);
                (AnalysisStatus::Error, AnalysisContent::failure(e.to_string()))
            }
        };

        if let (Some(store), Some(id)) = (&self.store, record) {
            let updated = match status {
                AnalysisStatus::Completed => store.mark_completed(id, &content).await,
                _ => store.mark_failed(id, &content).await,
            };
            if let Err(e) = updated {
                warn!("{} update error: {}", store.backend(), e);
            }
        }

        content
    }

    /// Insert the `processing` row for this job, if there is a store to write to.
    async fn record_start(&self, url: &str) -> Option<RecordId> {
        let store = self.store.as_ref()?;
        match store.insert_processing(url).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("{} insert error: {}", store.backend(), e);
                None
            }
        }
    }
}
