use crate::state::TaskState;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Outcome of one task of a freeze run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrozenRecord {
    /// The URL fetched, the route key that failed to resolve, or the
    /// external link that was skipped
    pub url: String,

    /// File written for this URL
    pub output_path: Option<PathBuf>,

    /// Terminal state of the task
    pub state: TaskState,

    /// Status answered by the application
    pub http_status: Option<u16>,

    /// Error message for failed tasks
    pub detail: Option<String>,

    /// SHA-256 hex digest of the written body
    pub digest: Option<String>,
}

impl FrozenRecord {
    fn new(url: impl Into<String>, state: TaskState) -> Self {
        Self {
            url: url.into(),
            output_path: None,
            state,
            http_status: None,
            detail: None,
            digest: None,
        }
    }

    pub fn written(
        url: impl Into<String>,
        output_path: PathBuf,
        http_status: u16,
        digest: String,
    ) -> Self {
        Self {
            output_path: Some(output_path),
            http_status: Some(http_status),
            digest: Some(digest),
            ..Self::new(url, TaskState::Written)
        }
    }

    pub fn skipped_non_ok(url: impl Into<String>, http_status: u16) -> Self {
        Self {
            http_status: Some(http_status),
            ..Self::new(url, TaskState::SkippedNonOk)
        }
    }

    pub fn skipped_external(url: impl Into<String>) -> Self {
        Self::new(url, TaskState::SkippedExternal)
    }

    pub fn failed(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..Self::new(url, TaskState::Failed)
        }
    }

    pub fn with_status(mut self, http_status: u16) -> Self {
        self.http_status = Some(http_status);
        self
    }
}

/// Result of a completed freeze run
#[derive(Debug, Clone)]
pub struct FreezeReport {
    /// One record per task that reached a terminal state, in crawl order
    pub records: Vec<FrozenRecord>,

    /// Tasks dropped because their route or URL was already handled
    pub deduplicated: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl FreezeReport {
    /// Number of records in `state`
    pub fn count(&self, state: TaskState) -> usize {
        self.records.iter().filter(|r| r.state == state).count()
    }

    pub fn written_count(&self) -> usize {
        self.count(TaskState::Written)
    }

    pub fn skipped_count(&self) -> usize {
        self.records.iter().filter(|r| r.state.is_skipped()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.records.iter().filter(|r| r.state.is_error()).count()
    }

    /// Records of pages written to disk
    pub fn written(&self) -> impl Iterator<Item = &FrozenRecord> {
        self.records.iter().filter(|r| r.state.is_success())
    }

    /// Records of tasks that failed
    pub fn failures(&self) -> impl Iterator<Item = &FrozenRecord> {
        self.records.iter().filter(|r| r.state.is_error())
    }

    /// Whether any task failed
    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Returns the share of fetched pages that were written, as a percentage
    pub fn success_rate(&self) -> f64 {
        let fetched = self.written_count() + self.count(TaskState::SkippedNonOk);
        if fetched == 0 {
            return 0.0;
        }
        (self.written_count() as f64 / fetched as f64) * 100.0
    }
}

/// SHA-256 hex digest of a page body
pub fn body_digest(body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body);
    hex::encode(hasher.finalize())
}
