//! Shared types and tuning constants for the ingestion pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::github::GitHubError;
use crate::store::StoreError;

/// Number of items processed concurrently per batch group.
pub const BATCH_SIZE: usize = 5;

/// Pause between batch groups to smooth request bursts.
pub const BATCH_PAUSE: Duration = Duration::from_millis(50);

/// Maximum search pages scanned per full refresh.
pub const MAX_PAGES: u32 = 10;

/// Search page size (the API maximum).
pub const SEARCH_PER_PAGE: u8 = 100;

/// Overall cap on issues processed per full refresh.
pub const MAX_ITEMS_OVERALL: usize = 1000;

/// Minimum star count for a repository's issues to be ingested.
pub const MIN_STARS: i32 = 500;

/// Concurrent repository lookups per search page.
pub const REPO_FETCH_CONCURRENCY: usize = 5;

/// Pause after a rate-limited page before moving to the next one.
pub const RATE_LIMIT_PAUSE: Duration = Duration::from_secs(5);

/// The search query driving the full refresh.
pub const SEARCH_QUERY: &str = "label:\"good first issue\" state:open";

/// Default staleness window in days.
pub const DEFAULT_STALE_AGE_DAYS: u32 = 2;

/// Default number of stale issues re-validated per run.
pub const DEFAULT_STALE_BATCH_SIZE: u32 = 30;

/// Floor on the stale-issue fetch limit regardless of the requested batch
/// size.
pub const MIN_STALE_FETCH_LIMIT: u32 = 10;

/// A single item's failure, attributable to one issue, repository, or page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemError {
    /// What failed: an issue's GitHub id, `repo:<url>`, or `page:<n>`.
    pub id: String,
    /// Error message.
    pub error: String,
}

impl ItemError {
    pub fn new(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            error: error.into(),
        }
    }
}

/// Accumulated counters for a batch or a whole refresh operation.
#[derive(Debug, Default)]
pub struct RefreshStats {
    /// Items processed successfully.
    pub processed: usize,
    /// Items whose processing reported a mutation.
    pub updated_count: usize,
    /// Per-item failures. A failing item never blocks the others.
    pub errors: Vec<ItemError>,
}

impl RefreshStats {
    /// Fold another stats block into this one.
    pub fn merge(&mut self, other: RefreshStats) {
        self.processed += other.processed;
        self.updated_count += other.updated_count;
        self.errors.extend(other.errors);
    }
}

/// Result of a refresh operation as returned to the invoking job.
///
/// `success` is false when any per-item error was recorded or the operation
/// failed outright; in the latter case `error` carries the message and the
/// counters are zero.
#[derive(Debug, Serialize)]
pub struct RefreshOutcome {
    pub success: bool,
    /// Items processed successfully.
    pub count: usize,
    /// Items whose processing reported a mutation.
    pub updated_count: usize,
    /// Per-item failures (empty on a clean run).
    pub errors: Vec<ItemError>,
    /// Operation-level failure message, if the run never produced counters.
    pub error: Option<String>,
}

/// Errors from the sync engine that cannot be attributed to a single item.
#[derive(Debug, Error)]
pub enum SyncError {
    /// GitHub API failure.
    #[error("GitHub API error: {0}")]
    GitHub(#[from] GitHubError),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A re-fetch during staleness refresh failed.
    #[error("Failed to fetch {what} {target}: {source}")]
    Refetch {
        what: &'static str,
        target: String,
        #[source]
        source: GitHubError,
    },

    /// The upstream issue or repository no longer exists.
    #[error("Issue or repository not found upstream: {target}")]
    MissingUpstream { target: String },
}

impl SyncError {
    /// Check if the underlying cause is GitHub rate limiting.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            SyncError::GitHub(e) | SyncError::Refetch { source: e, .. } => e.is_rate_limit(),
            _ => false,
        }
    }
}
