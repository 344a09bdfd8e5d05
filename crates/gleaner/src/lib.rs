//! Gleaner - harvests GitHub good-first-issues into a relational store.
//!
//! The library implements a batch ingestion pipeline: it searches GitHub for
//! open issues labeled "good first issue", keeps only those whose owning
//! repository is popular enough, and upserts repositories, issues, and
//! labels idempotently. A second entry point re-validates previously
//! harvested rows once they go stale.
//!
//! # Example
//!
//! ```ignore
//! use gleaner::{GitHubClient, connect_and_migrate, refresh_github_data};
//!
//! let db = connect_and_migrate("postgres:///gleaner").await?;
//! let client = GitHubClient::new(Some(&token))?;
//!
//! let outcome = refresh_github_data(&db, &client, None).await;
//! println!("ingested {} issues", outcome.count);
//!
//! db.close().await?;
//! ```

pub mod cache;
pub mod db;
pub mod entity;
pub mod github;
pub mod migration;
pub mod store;
pub mod sync;

pub use cache::{CacheError, CacheInvalidator, NoopCacheInvalidator};
pub use db::{connect, connect_and_migrate};
pub use entity::prelude::*;
pub use github::{GitHubApi, GitHubClient, GitHubError};
pub use store::{SavedRecord, StoreError, save_data};
pub use sync::{
    ProgressCallback, RefreshOutcome, SyncProgress, refresh_existing_issues, refresh_github_data,
};
