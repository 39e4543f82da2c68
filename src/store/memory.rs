//! In-memory analysis store.
//!
//! Useful for testing.

use super::{AnalysisContent, AnalysisRecord, AnalysisStatus, AnalysisStore, RecordId};
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::RwLock;

/// In-memory analysis store.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<AnalysisRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn finish(&self, id: RecordId, status: AnalysisStatus, content: &AnalysisContent) {
        let mut records = self.records.write().unwrap();
        if let Some(record) = usize::try_from(id).ok().and_then(|i| records.get_mut(i)) {
            if record.url_status == AnalysisStatus::Processing {
                record.url_status = status;
                record.url_content = Some(content.clone());
            }
        }
    }
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn insert_processing(&self, url: &str) -> Result<RecordId> {
        let mut records = self.records.write().unwrap();
        let id = records.len() as RecordId;
        records.push(AnalysisRecord {
            id: Some(id),
            url: url.to_string(),
            url_status: AnalysisStatus::Processing,
            url_content: None,
            created_at: Some(Utc::now()),
        });
        Ok(id)
    }

    async fn mark_completed(&self, id: RecordId, content: &AnalysisContent) -> Result<()> {
        self.finish(id, AnalysisStatus::Completed, content);
        Ok(())
    }

    async fn mark_failed(&self, id: RecordId, content: &AnalysisContent) -> Result<()> {
        self.finish(id, AnalysisStatus::Error, content);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>> {
        let records = self.records.read().unwrap();
        Ok(records.iter().rev().take(limit).cloned().collect())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
