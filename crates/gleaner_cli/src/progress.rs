//! Log-based progress reporting.
//!
//! The refresh engine emits progress events through a callback; as a
//! headless batch job, this CLI renders them as log lines.

use gleaner::{ProgressCallback, SyncProgress};

/// Build a progress callback that forwards events to `tracing`.
pub(crate) fn logging_callback() -> ProgressCallback {
    Box::new(|event| match event {
        SyncProgress::FetchingPage { page } => {
            tracing::info!(page, "Fetching search results page");
        }
        SyncProgress::PageFetched {
            page,
            count,
            total_count,
        } => {
            tracing::info!(page, count, total_count, "Fetched search results page");
        }
        SyncProgress::RepositoriesFetched { requested, fetched } => {
            tracing::info!(requested, fetched, "Fetched page repositories");
        }
        SyncProgress::PageFiltered {
            page,
            retained,
            dropped,
        } => {
            tracing::info!(page, retained, dropped, "Applied star-threshold filter");
        }
        SyncProgress::BatchCompleted {
            processed,
            updated,
            errors,
        } => {
            tracing::info!(processed, updated, errors, "Batch complete");
        }
        SyncProgress::RateLimitPause { page, pause_ms } => {
            tracing::warn!(page, pause_ms, "Rate limited, pausing");
        }
        SyncProgress::StaleSelected { count } => {
            tracing::info!(count, "Selected stale issues for re-validation");
        }
        SyncProgress::OperationFinished {
            processed,
            updated,
            errors,
        } => {
            tracing::info!(processed, updated, errors, "Operation finished");
        }
        _ => {}
    })
}
