//! GitHub API payload types.
//!
//! These are validated input structs for the subset of fields the pipeline
//! persists. Identity fields default to zero/empty when absent so the store
//! layer's required-field checks can reject malformed payloads explicitly
//! instead of failing deep inside a transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::issue_state::IssueState;

/// Response shape of `GET /search/issues`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueSearchResults {
    /// Total number of matching issues upstream (capped at 1000 retrievable).
    pub total_count: u64,
    /// True when the search timed out before scanning everything.
    #[serde(default)]
    pub incomplete_results: bool,
    /// The page of matching issues.
    pub items: Vec<IssuePayload>,
}

/// An issue as returned by the search and issue endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuePayload {
    /// GitHub's numeric issue ID.
    #[serde(default)]
    pub id: i64,
    /// Issue number within its repository.
    #[serde(default)]
    pub number: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub html_url: String,
    /// API URL of the owning repository. Search results carry this instead
    /// of an embedded repository object.
    #[serde(default)]
    pub repository_url: String,
    #[serde(default)]
    pub state: IssueState,
    #[serde(default)]
    pub comments: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assignee: Option<AssigneePayload>,
    #[serde(default)]
    pub labels: Vec<LabelPayload>,
}

impl IssuePayload {
    /// Login of the current assignee, if any.
    pub fn assignee_login(&self) -> Option<String> {
        self.assignee.as_ref().map(|a| a.login.clone())
    }
}

/// The assignee object embedded in an issue payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssigneePayload {
    #[serde(default)]
    pub login: String,
}

/// A label object embedded in an issue payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// A repository as returned by `GET /repos/{full_name}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryPayload {
    /// GitHub's numeric repository ID.
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: i32,
    #[serde(default)]
    pub forks_count: i32,
    #[serde(default)]
    pub watchers_count: i32,
    /// Primary language, if GitHub has detected one.
    #[serde(default)]
    pub language: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
