use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, SetmError};
use crate::job::{JobMode, VideoQuality};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Completed,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => f.write_str("Completed"),
            Self::Failed => f.write_str("Failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub process_type: JobMode,
    /// Not applicable to audio jobs
    pub quality: Option<VideoQuality>,
    /// Final output, or empty when the job failed before producing one
    pub final_path: String,
    pub processed_at: DateTime<Utc>,
    pub status: JobStatus,
    /// Error message for failed jobs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Processing history persisted as a JSON array
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<HistoryRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    async fn store(&self, records: &[HistoryRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(records)?;
        // Replaced via rename; readers never see a half-written file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    pub async fn append(&self, record: HistoryRecord) -> Result<()> {
        let mut records = match self.load().await {
            Ok(records) => records,
            Err(SetmError::Json(e)) => {
                warn!("History file {} is unreadable, starting over: {}", self.path.display(), e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        debug!("Saving history record {} ({})", record.id, record.status);
        records.push(record);
        self.store(&records).await
    }

    /// Most recent records first
    pub async fn list(&self, limit: usize) -> Result<Vec<HistoryRecord>> {
        let mut records = self.load().await?;
        records.sort_by(|a, b| b.processed_at.cmp(&a.processed_at));
        records.truncate(limit);
        Ok(records)
    }

    /// Remove all records, returning how many were deleted
    pub async fn clear(&self) -> Result<usize> {
        let count = self.load().await.map(|r| r.len()).unwrap_or(0);
        if self.path.exists() {
            fs::remove_file(&self.path).await?;
        }
        info!("Cleared {} history records", count);
        Ok(count)
    }
}
