//! Issue entity - a GitHub issue harvested because it carried the
//! "good first issue" label when ingestion saw it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::issue_state::IssueState;

/// Issue model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "issues")]
pub struct Model {
    /// Internal UUID primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    // ─── Identity ────────────────────────────────────────────────────────────
    /// GitHub's numeric issue ID (unique natural key).
    pub github_id: i64,
    /// Owning repository (local surrogate key).
    pub repository_id: Uuid,
    /// Issue number within its repository.
    pub number: i32,

    // ─── Content ─────────────────────────────────────────────────────────────
    /// Issue title.
    #[sea_orm(column_type = "Text")]
    pub title: String,
    /// Web URL of the issue.
    #[sea_orm(column_type = "Text")]
    pub html_url: String,
    /// Open/closed state as last observed.
    pub state: IssueState,
    /// Comment count.
    pub comments: i32,
    /// Login of the current assignee, if any.
    pub assignee: Option<String>,
    /// Whether the issue still counts as a good first issue. Force-set to
    /// true by ingestion; cleared by the cleanup step once the issue is no
    /// longer open.
    pub is_good_first_issue: bool,

    // ─── Timestamps ──────────────────────────────────────────────────────────
    /// When the issue was created on GitHub.
    pub created_at: Option<DateTimeWithTimeZone>,
    /// When the issue was last updated on GitHub.
    pub updated_at: Option<DateTimeWithTimeZone>,
    /// When this record was last re-validated against GitHub. Null for rows
    /// written before refresh tracking existed.
    pub last_refreshed: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// An issue belongs to a repository.
    #[sea_orm(
        belongs_to = "super::repository::Entity",
        from = "Column::RepositoryId",
        to = "super::repository::Column::Id"
    )]
    Repository,
}

impl Related<super::repository::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Repository.def()
    }
}

impl Related<super::label::Entity> for Entity {
    fn to() -> RelationDef {
        super::issue_label::Relation::Label.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::issue_label::Relation::Issue.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
