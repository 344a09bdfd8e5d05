//! Progress reporting for refresh operations.
//!
//! Events are emitted through an optional callback so the hosting process
//! decides how to surface them (the CLI logs them through `tracing`).

/// Progress events emitted during refresh operations.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// Starting to fetch a search results page.
    FetchingPage {
        /// Page number (1-indexed).
        page: u32,
    },

    /// Fetched a page of search results.
    PageFetched {
        page: u32,
        /// Number of issues on this page.
        count: usize,
        /// Total matching issues reported by the search API.
        total_count: u64,
    },

    /// Finished the page's repository lookups.
    RepositoriesFetched {
        /// Distinct repository URLs on the page.
        requested: usize,
        /// Lookups that succeeded.
        fetched: usize,
    },

    /// Applied the star-threshold filter to a page.
    PageFiltered {
        page: u32,
        /// Issues that proceed to upsert.
        retained: usize,
        /// Issues silently dropped by the filter.
        dropped: usize,
    },

    /// A batch of items finished processing.
    BatchCompleted {
        processed: usize,
        updated: usize,
        errors: usize,
    },

    /// Rate limited on a page; pausing before the next one.
    RateLimitPause {
        page: u32,
        /// Pause duration in milliseconds.
        pause_ms: u64,
    },

    /// Selected stale issues for re-validation.
    StaleSelected {
        count: usize,
    },

    /// A refresh operation finished.
    OperationFinished {
        processed: usize,
        updated: usize,
        errors: usize,
    },
}

/// Callback type for receiving progress events.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is configured.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_emit_forwards_to_callback() {
        let events: Arc<Mutex<Vec<SyncProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&events);
        let callback: ProgressCallback = Box::new(move |event| {
            captured.lock().unwrap_or_else(|e| e.into_inner()).push(event);
        });

        emit(Some(&callback), SyncProgress::FetchingPage { page: 1 });
        emit(None, SyncProgress::FetchingPage { page: 2 });

        let events = events.lock().unwrap_or_else(|e| e.into_inner());
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            SyncProgress::FetchingPage { page: 1 }
        ));
    }
}
