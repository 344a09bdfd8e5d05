//! Transactional upsert of a repository, its issue, and the issue's labels.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::prelude::*;
use crate::entity::{issue, issue_label, label, repository};
use crate::github::types::{IssuePayload, LabelPayload, RepositoryPayload};

use super::errors::{Result, StoreError};

/// Maximum retries when the upsert transaction hits a deadlock.
pub const SAVE_RETRY_ATTEMPTS: u32 = 3;

/// Initial backoff in milliseconds between deadlock retries (doubles each
/// attempt).
pub const SAVE_RETRY_BACKOFF_MS: u64 = 500;

/// Fallback label color when GitHub reports none.
pub const DEFAULT_LABEL_COLOR: &str = "8957e5";

/// What a successful `save_data` call wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavedRecord {
    /// Only the repository was upserted.
    Repository { repository_id: Uuid },
    /// The repository, the issue, and the issue's label set were upserted.
    Issue {
        repository_id: Uuid,
        issue_id: Uuid,
    },
}

/// Upsert a repository (and optionally one of its issues plus labels) in a
/// single transaction.
///
/// Repository and issue rows are keyed on their GitHub IDs: insert when
/// absent, otherwise overwrite the mutable fields and advance
/// `last_refreshed`. When an issue is supplied its `is_good_first_issue`
/// flag is force-set to true (ingestion only ever touches issues seen with
/// that label) and its label associations are deleted and re-inserted so the
/// join table mirrors the payload's label set exactly.
///
/// # Errors
/// - `StoreError::InvalidInput` if the repository payload lacks a GitHub id
///   or full name, or an issue payload lacks a GitHub id or repository URL.
///   Raised before any database call and never retried.
/// - `StoreError::Database` for persistence failures. Deadlocks are retried
///   up to [`SAVE_RETRY_ATTEMPTS`] times with exponential backoff starting
///   at [`SAVE_RETRY_BACKOFF_MS`]; anything else propagates immediately.
pub async fn save_data(
    db: &DatabaseConnection,
    repo: &RepositoryPayload,
    languages: &[String],
    issue: Option<&IssuePayload>,
) -> Result<SavedRecord> {
    if repo.id == 0 || repo.full_name.is_empty() {
        return Err(StoreError::invalid_input(
            "repository payload is missing its github id or full name",
        ));
    }
    if let Some(issue) = issue {
        if issue.id == 0 || issue.repository_url.is_empty() {
            return Err(StoreError::invalid_input(
                "issue payload is missing its github id or repository url",
            ));
        }
    }

    with_deadlock_retry(|| save_data_inner(db, repo, languages, issue)).await
}

/// Run `operation`, retrying on detected deadlocks.
pub(crate) async fn with_deadlock_retry<T, F, Fut>(mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut backoff_ms = SAVE_RETRY_BACKOFF_MS;
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_deadlock() && attempt < SAVE_RETRY_ATTEMPTS => {
                attempt += 1;
                tracing::warn!(
                    attempt,
                    max_retries = SAVE_RETRY_ATTEMPTS,
                    backoff_ms,
                    error = %e,
                    "Deadlock detected, retrying upsert"
                );
                tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;
                backoff_ms *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn save_data_inner(
    db: &DatabaseConnection,
    repo: &RepositoryPayload,
    languages: &[String],
    issue: Option<&IssuePayload>,
) -> Result<SavedRecord> {
    let txn = db.begin().await?;

    let repo_model = upsert_repository(&txn, repo, languages).await?;

    let saved = match issue {
        Some(issue) => {
            let issue_model = upsert_issue(&txn, issue, repo_model.id).await?;
            replace_issue_labels(&txn, issue_model.id, &issue.labels).await?;
            SavedRecord::Issue {
                repository_id: repo_model.id,
                issue_id: issue_model.id,
            }
        }
        None => SavedRecord::Repository {
            repository_id: repo_model.id,
        },
    };

    txn.commit().await?;
    Ok(saved)
}

async fn upsert_repository<C: ConnectionTrait>(
    conn: &C,
    repo: &RepositoryPayload,
    languages: &[String],
) -> Result<RepositoryModel> {
    let now = Utc::now().fixed_offset();
    let languages_json = serde_json::json!(languages);

    let existing = Repository::find()
        .filter(repository::Column::GithubId.eq(repo.id))
        .one(conn)
        .await?;

    match existing {
        Some(existing) => {
            let mut model: repository::ActiveModel = existing.into();
            model.name = Set(repo.name.clone());
            model.full_name = Set(repo.full_name.clone());
            model.html_url = Set(repo.html_url.clone());
            model.stargazers_count = Set(repo.stargazers_count);
            model.forks_count = Set(repo.forks_count);
            model.watchers_count = Set(repo.watchers_count);
            model.language = Set(repo.language.clone());
            model.languages = Set(languages_json);
            model.updated_at = Set(repo.updated_at.map(|dt| dt.fixed_offset()));
            model.last_refreshed = Set(now);
            model.update(conn).await.map_err(StoreError::from)
        }
        None => repository::ActiveModel {
            id: Set(Uuid::new_v4()),
            github_id: Set(repo.id),
            name: Set(repo.name.clone()),
            full_name: Set(repo.full_name.clone()),
            html_url: Set(repo.html_url.clone()),
            stargazers_count: Set(repo.stargazers_count),
            forks_count: Set(repo.forks_count),
            watchers_count: Set(repo.watchers_count),
            language: Set(repo.language.clone()),
            languages: Set(languages_json),
            created_at: Set(repo.created_at.map(|dt| dt.fixed_offset())),
            updated_at: Set(repo.updated_at.map(|dt| dt.fixed_offset())),
            last_refreshed: Set(now),
        }
        .insert(conn)
        .await
        .map_err(StoreError::from),
    }
}

async fn upsert_issue<C: ConnectionTrait>(
    conn: &C,
    issue: &IssuePayload,
    repository_id: Uuid,
) -> Result<IssueModel> {
    let now = Utc::now().fixed_offset();

    let existing = Issue::find()
        .filter(issue::Column::GithubId.eq(issue.id))
        .one(conn)
        .await?;

    match existing {
        Some(existing) => {
            let mut model: issue::ActiveModel = existing.into();
            model.title = Set(issue.title.clone());
            model.state = Set(issue.state);
            model.comments = Set(issue.comments);
            model.assignee = Set(issue.assignee_login());
            model.is_good_first_issue = Set(true);
            model.updated_at = Set(issue.updated_at.map(|dt| dt.fixed_offset()));
            model.last_refreshed = Set(Some(now));
            model.update(conn).await.map_err(StoreError::from)
        }
        None => issue::ActiveModel {
            id: Set(Uuid::new_v4()),
            github_id: Set(issue.id),
            repository_id: Set(repository_id),
            number: Set(issue.number),
            title: Set(issue.title.clone()),
            html_url: Set(issue.html_url.clone()),
            state: Set(issue.state),
            comments: Set(issue.comments),
            assignee: Set(issue.assignee_login()),
            is_good_first_issue: Set(true),
            created_at: Set(issue.created_at.map(|dt| dt.fixed_offset())),
            updated_at: Set(issue.updated_at.map(|dt| dt.fixed_offset())),
            last_refreshed: Set(Some(now)),
        }
        .insert(conn)
        .await
        .map_err(StoreError::from),
    }
}

/// Replace the issue's label associations with the payload's label set.
///
/// Existing associations are always deleted first, so an issue whose labels
/// were all removed upstream ends up with none.
async fn replace_issue_labels<C: ConnectionTrait>(
    conn: &C,
    issue_id: Uuid,
    labels: &[LabelPayload],
) -> Result<()> {
    IssueLabel::delete_many()
        .filter(issue_label::Column::IssueId.eq(issue_id))
        .exec(conn)
        .await?;

    for label in labels {
        if label.name.is_empty() {
            continue;
        }

        let label_model = upsert_label(conn, label).await?;

        let link = issue_label::ActiveModel {
            issue_id: Set(issue_id),
            label_id: Set(label_model.id),
        };
        // A payload can repeat a label name; the conflict target absorbs it.
        IssueLabel::insert(link)
            .on_conflict(
                OnConflict::columns([
                    issue_label::Column::IssueId,
                    issue_label::Column::LabelId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
    }

    Ok(())
}

async fn upsert_label<C: ConnectionTrait>(conn: &C, payload: &LabelPayload) -> Result<LabelModel> {
    let color = payload
        .color
        .clone()
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_LABEL_COLOR.to_string());

    let existing = Label::find()
        .filter(label::Column::Name.eq(payload.name.clone()))
        .one(conn)
        .await?;

    match existing {
        Some(existing) => {
            if existing.color.as_deref() == Some(color.as_str()) {
                return Ok(existing);
            }
            let mut model: label::ActiveModel = existing.into();
            model.color = Set(Some(color));
            model.update(conn).await.map_err(StoreError::from)
        }
        None => label::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(payload.name.clone()),
            color: Set(Some(color)),
        }
        .insert(conn)
        .await
        .map_err(StoreError::from),
    }
}
