//! The ingestion pipeline: batch processing, refresh orchestration, and
//! operation bookkeeping.
//!
//! # Module Structure
//!
//! - [`types`] - tuning constants, stats, outcomes, `SyncError`
//! - [`batch`] - `process_batch()`: bounded concurrency with per-item
//!   failure isolation
//! - [`progress`] - progress events: `SyncProgress`, `ProgressCallback`,
//!   `emit()`
//! - [`engine`] - `refresh_github_data()` and `refresh_existing_issues()`
//! - `operation` - metadata bracketing around both refresh flavors
//!
//! # Stop conditions for the full refresh
//!
//! The page loop ends when a page comes back empty, the overall processed
//! count reaches [`MAX_ITEMS_OVERALL`], the page count implied by the
//! search's total count is exhausted, or [`MAX_PAGES`] pages have been
//! scanned. A rate-limited page is recorded as a page error and followed by
//! a [`RATE_LIMIT_PAUSE`] before the next page; it does not abort the run.

pub mod batch;
pub mod engine;
mod operation;
mod progress;
mod types;

// Re-export types
pub use types::{ItemError, RefreshOutcome, RefreshStats, SyncError};

// Re-export constants
pub use types::{
    BATCH_PAUSE, BATCH_SIZE, DEFAULT_STALE_AGE_DAYS, DEFAULT_STALE_BATCH_SIZE, MAX_ITEMS_OVERALL,
    MAX_PAGES, MIN_STALE_FETCH_LIMIT, MIN_STARS, RATE_LIMIT_PAUSE, REPO_FETCH_CONCURRENCY,
    SEARCH_PER_PAGE, SEARCH_QUERY,
};

// Re-export progress types
pub use progress::{ProgressCallback, SyncProgress, emit};

// Re-export engine functions for convenience
pub use engine::{refresh_existing_issues, refresh_github_data};

// Re-export the batch processor
pub use batch::process_batch;
