//! Refresh operation status vocabulary recorded in the metadata row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status of the most recent (or in-flight) refresh operation.
///
/// Written to the metadata singleton at operation start and completion so
/// downstream consumers can report data freshness without inspecting logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum RefreshStatus {
    /// Schema created, no refresh has run yet.
    #[sea_orm(string_value = "initialized")]
    Initialized,
    /// Full refresh in progress.
    #[sea_orm(string_value = "refreshing")]
    Refreshing,
    /// Staleness refresh in progress.
    #[sea_orm(string_value = "refreshing_existing")]
    RefreshingExisting,
    /// Last operation finished with no per-item errors.
    #[sea_orm(string_value = "success")]
    Success,
    /// Last operation finished but some items failed.
    #[sea_orm(string_value = "completed_with_errors")]
    CompletedWithErrors,
    /// Last operation failed before producing a result.
    #[sea_orm(string_value = "error")]
    Error,
}

impl std::fmt::Display for RefreshStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RefreshStatus::Initialized => "initialized",
            RefreshStatus::Refreshing => "refreshing",
            RefreshStatus::RefreshingExisting => "refreshing_existing",
            RefreshStatus::Success => "success",
            RefreshStatus::CompletedWithErrors => "completed_with_errors",
            RefreshStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}
