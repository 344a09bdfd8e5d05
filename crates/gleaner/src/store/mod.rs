//! Persistence layer: transactional upserts, staleness queries, and
//! metadata bookkeeping.
//!
//! # Module Structure
//!
//! - [`errors`] - `StoreError` and deadlock classification
//! - [`save`] - `save_data()`: the idempotent repository/issue/label upsert
//! - [`query`] - cleanup, staleness selection, metadata, counts

mod errors;
mod query;
mod save;

pub use errors::{Result, StoreError};
pub use query::{
    StaleIssue, clear_flag_on_closed_issues, count_issues, count_open_good_first_issues,
    count_repositories, find_issue_by_github_id, find_repository_by_github_id, find_stale_issues,
    get_metadata, update_metadata,
};
pub use save::{
    DEFAULT_LABEL_COLOR, SAVE_RETRY_ATTEMPTS, SAVE_RETRY_BACKOFF_MS, SavedRecord, save_data,
};
