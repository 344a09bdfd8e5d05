//! Queries and metadata bookkeeping for the ingestion pipeline.

use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entity::prelude::*;
use crate::entity::{issue, repository};

use super::errors::{Result, StoreError};

/// A stale issue selected for re-validation, joined with its repository.
///
/// Carries the minimum needed to re-fetch the issue and repository details
/// from GitHub.
#[derive(Debug, Clone)]
pub struct StaleIssue {
    /// GitHub's numeric issue ID.
    pub github_id: i64,
    /// Issue number within its repository.
    pub number: i32,
    /// Owner-qualified repository name.
    pub full_name: String,
}

/// Clear the good-first-issue flag on issues that are no longer open.
///
/// Run at the start of a full refresh so closed issues stop surfacing
/// before their rows are eventually removed by the maintenance job.
///
/// Returns the number of rows updated.
pub async fn clear_flag_on_closed_issues(db: &DatabaseConnection) -> Result<u64> {
    let result = Issue::update_many()
        .col_expr(issue::Column::IsGoodFirstIssue, Expr::value(false))
        .filter(issue::Column::State.ne(IssueState::Open))
        .filter(issue::Column::IsGoodFirstIssue.eq(true))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Find open, flagged issues whose `last_refreshed` is older than the age
/// window (or never set), oldest `updated_at` first.
///
/// Returns up to `limit` issues joined with their repository's full name.
/// Issues whose repository row is missing are skipped.
pub async fn find_stale_issues(
    db: &DatabaseConnection,
    age_in_days: u32,
    limit: u64,
) -> Result<Vec<StaleIssue>> {
    let cutoff = (Utc::now() - Duration::days(i64::from(age_in_days))).fixed_offset();

    let rows = Issue::find()
        .find_also_related(Repository)
        .filter(issue::Column::IsGoodFirstIssue.eq(true))
        .filter(issue::Column::State.eq(IssueState::Open))
        .filter(
            Condition::any()
                .add(issue::Column::LastRefreshed.is_null())
                .add(issue::Column::LastRefreshed.lt(cutoff)),
        )
        .order_by_asc(issue::Column::UpdatedAt)
        .limit(limit)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(issue, repo)| {
            repo.map(|repo| StaleIssue {
                github_id: issue.github_id,
                number: issue.number,
                full_name: repo.full_name,
            })
        })
        .collect())
}

/// Write the metadata singleton: refresh timestamp, status, error detail.
///
/// The row is seeded by migration; if it is missing (hand-pruned database),
/// a fresh one is inserted.
pub async fn update_metadata(
    db: &DatabaseConnection,
    status: RefreshStatus,
    error: Option<String>,
) -> Result<()> {
    let now = Utc::now().fixed_offset();

    let result = Metadata::update_many()
        .col_expr(MetadataColumn::LastRefresh, Expr::value(now))
        .col_expr(MetadataColumn::Status, Expr::value(status))
        .col_expr(MetadataColumn::Error, Expr::value(error.clone()))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        MetadataActiveModel {
            id: Set(Uuid::new_v4()),
            last_refresh: Set(now),
            status: Set(status),
            error: Set(error),
        }
        .insert(db)
        .await
        .map_err(StoreError::from)?;
    }

    Ok(())
}

/// Read the metadata singleton.
pub async fn get_metadata(db: &DatabaseConnection) -> Result<Option<MetadataModel>> {
    Metadata::find().one(db).await.map_err(StoreError::from)
}

/// Count all repositories.
pub async fn count_repositories(db: &DatabaseConnection) -> Result<u64> {
    Repository::find().count(db).await.map_err(StoreError::from)
}

/// Count all issues.
pub async fn count_issues(db: &DatabaseConnection) -> Result<u64> {
    Issue::find().count(db).await.map_err(StoreError::from)
}

/// Count issues currently eligible for display: open and still flagged.
pub async fn count_open_good_first_issues(db: &DatabaseConnection) -> Result<u64> {
    Issue::find()
        .filter(issue::Column::State.eq(IssueState::Open))
        .filter(issue::Column::IsGoodFirstIssue.eq(true))
        .count(db)
        .await
        .map_err(StoreError::from)
}

/// Find a repository by its GitHub ID.
pub async fn find_repository_by_github_id(
    db: &DatabaseConnection,
    github_id: i64,
) -> Result<Option<RepositoryModel>> {
    Repository::find()
        .filter(repository::Column::GithubId.eq(github_id))
        .one(db)
        .await
        .map_err(StoreError::from)
}

/// Find an issue by its GitHub ID.
pub async fn find_issue_by_github_id(
    db: &DatabaseConnection,
    github_id: i64,
) -> Result<Option<IssueModel>> {
    Issue::find()
        .filter(issue::Column::GithubId.eq(github_id))
        .one(db)
        .await
        .map_err(StoreError::from)
}
