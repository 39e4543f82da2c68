//! SQLite analysis history.

use super::{AnalysisContent, AnalysisRecord, AnalysisStatus, AnalysisStore, RecordId};
use crate::error::{FactCheckError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS video_analysis (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        url TEXT NOT NULL,
        url_status TEXT NOT NULL,
        url_content TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_video_analysis_url ON video_analysis(url);
    CREATE INDEX IF NOT EXISTS idx_video_analysis_created_at ON video_analysis(created_at);
"#;

/// Local analysis history in a SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the history database at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized analysis history at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| FactCheckError::Store(format!("Failed to acquire lock: {}", e)))
    }

    /// Finish a `processing` row. Rows already finished are left alone.
    fn finish(&self, id: RecordId, status: AnalysisStatus, content: &AnalysisContent) -> Result<()> {
        let json = serde_json::to_string(content)?;
        self.lock()?.execute(
            "UPDATE video_analysis SET url_status = ?1, url_content = ?2, updated_at = ?3
             WHERE id = ?4 AND url_status = ?5",
            params![
                status.as_str(),
                json,
                Utc::now().to_rfc3339(),
                id,
                AnalysisStatus::Processing.as_str()
            ],
        )?;
        Ok(())
    }
}

#[async_trait]
impl AnalysisStore for SqliteStore {
    async fn insert_processing(&self, url: &str) -> Result<RecordId> {
        let now = Utc::now().to_rfc3339();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO video_analysis (url, url_status, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            params![url, AnalysisStatus::Processing.as_str(), now],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn mark_completed(&self, id: RecordId, content: &AnalysisContent) -> Result<()> {
        self.finish(id, AnalysisStatus::Completed, content)
    }

    async fn mark_failed(&self, id: RecordId, content: &AnalysisContent) -> Result<()> {
        self.finish(id, AnalysisStatus::Error, content)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, url, url_status, url_content, created_at FROM video_analysis
             ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, RecordId>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, url, status, content, created_at) = row?;
            records.push(AnalysisRecord {
                id: Some(id),
                url,
                url_status: status.parse().map_err(FactCheckError::Store)?,
                url_content: content.map(|c| serde_json::from_str(&c)).transpose()?,
                created_at: DateTime::parse_from_rfc3339(&created_at)
                    .ok()
                    .map(|d| d.with_timezone(&Utc)),
            });
        }

        Ok(records)
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses(records: &[AnalysisRecord]) -> Vec<AnalysisStatus> {
        records.iter().map(|r| r.url_status).collect()
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let store = SqliteStore::in_memory().unwrap();
        let a = store.insert_processing("https://a").await.unwrap();
        let b = store.insert_processing("https://b").await.unwrap();
        assert_ne!(a, b);

        store
            .mark_completed(a, &AnalysisContent::success("report"))
            .await
            .unwrap();
        store
            .mark_failed(b, &AnalysisContent::failure("boom"))
            .await
            .unwrap();

        let records = store.recent(10).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url, "https://b");
        assert_eq!(records[0].id, Some(b));
        assert_eq!(records[0].url_status, AnalysisStatus::Error);
        assert_eq!(records[0].url_content.as_ref().unwrap().error.as_deref(), Some("boom"));
        assert_eq!(records[1].url_status, AnalysisStatus::Completed);
        assert!(records[1].created_at.is_some());
    }

    #[tokio::test]
    async fn test_finished_rows_are_not_updated_again() {
        let store = SqliteStore::in_memory().unwrap();
        let id = store.insert_processing("https://a").await.unwrap();
        store
            .mark_failed(id, &AnalysisContent::failure("first"))
            .await
            .unwrap();

        store
            .mark_completed(id, &AnalysisContent::success("late"))
            .await
            .unwrap();

        let records = store.recent(10).await.unwrap();
        assert_eq!(records[0].url_status, AnalysisStatus::Error);
        assert_eq!(records[0].url_content.as_ref().unwrap().error.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_failed_rerun_keeps_earlier_report() {
        let store = SqliteStore::in_memory().unwrap();
        let first = store.insert_processing("https://a").await.unwrap();
        store
            .mark_completed(first, &AnalysisContent::success("report"))
            .await
            .unwrap();

        let second = store.insert_processing("https://a").await.unwrap();
        store
            .mark_failed(second, &AnalysisContent::failure("quota"))
            .await
            .unwrap();

        let records = store.recent(10).await.unwrap();
        assert_eq!(statuses(&records), vec![AnalysisStatus::Error, AnalysisStatus::Completed]);
        assert_eq!(records[1].url_content.as_ref().unwrap().result.as_deref(), Some("report"));
    }

    #[tokio::test]
    async fn test_concurrent_jobs_finish_independently() {
        let store = SqliteStore::in_memory().unwrap();
        let first = store.insert_processing("https://a").await.unwrap();
        let _second = store.insert_processing("https://a").await.unwrap();

        store
            .mark_completed(first, &AnalysisContent::success("report"))
            .await
            .unwrap();

        let records = store.recent(10).await.unwrap();
        assert_eq!(statuses(&records), vec![AnalysisStatus::Processing, AnalysisStatus::Completed]);
    }

    #[tokio::test]
    async fn test_recent_limit_and_file_backed() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(&dir.path().join("nested").join("history.db")).unwrap();
        for i in 0..5 {
            store.insert_processing(&format!("https://{}", i)).await.unwrap();
        }

        let records = store.recent(3).await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].url, "https://4");
        assert!(records[0].url_content.is_none());
    }
}
