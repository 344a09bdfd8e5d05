//! End-to-end tests for the refresh engine.
//!
//! A scripted `GitHubApi` implementation drives the full-refresh and
//! staleness flows against an in-memory SQLite database, covering the
//! filter/dedup/stop semantics and the operation wrapper's bookkeeping.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use gleaner::connect_and_migrate;
use gleaner::entity::issue;
use gleaner::entity::prelude::*;
use gleaner::github::types::{IssuePayload, IssueSearchResults, LabelPayload, RepositoryPayload};
use gleaner::github::{GitHubApi, GitHubError};
use gleaner::store;
use gleaner::sync::{refresh_existing_issues, refresh_github_data};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

// ─── Scripted GitHub API ───────────────────────────────────────────────────────

#[derive(Default)]
struct ScriptedGitHub {
    /// Search pages, 1-indexed; pages beyond the script come back empty.
    pages: Vec<Vec<IssuePayload>>,
    /// total_count reported with every search response.
    total_count: u64,
    /// Pages that fail with a rate-limit error.
    rate_limited_pages: HashSet<u32>,
    /// Repositories by API URL (the full-refresh lookup path).
    repos_by_url: HashMap<String, RepositoryPayload>,
    /// Repository URLs that fail with a server error.
    failing_repo_urls: HashSet<String>,
    /// Repositories by full name (the staleness lookup path).
    repos_by_full_name: HashMap<String, RepositoryPayload>,
    /// Issues by (full_name, number) for the staleness lookup path.
    issues_by_key: HashMap<(String, i32), IssuePayload>,
    /// Languages by repository full name.
    languages: HashMap<String, Vec<String>>,
    search_calls: AtomicU32,
}

#[async_trait]
impl GitHubApi for ScriptedGitHub {
    async fn search_issues(
        &self,
        _query: &str,
        page: u32,
        _per_page: u8,
    ) -> Result<IssueSearchResults, GitHubError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);

        if self.rate_limited_pages.contains(&page) {
            return Err(GitHubError::Status {
                status: 403,
                body: "API rate limit exceeded".to_string(),
            });
        }

        let items = self
            .pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default();

        Ok(IssueSearchResults {
            total_count: self.total_count,
            incomplete_results: false,
            items,
        })
    }

    async fn fetch_repository(
        &self,
        repo_url: &str,
    ) -> Result<Option<RepositoryPayload>, GitHubError> {
        if self.failing_repo_urls.contains(repo_url) {
            return Err(GitHubError::Status {
                status: 500,
                body: "Internal Server Error".to_string(),
            });
        }
        match self.repos_by_url.get(repo_url) {
            Some(repo) => Ok(Some(repo.clone())),
            None => Err(GitHubError::Status {
                status: 404,
                body: "Not Found".to_string(),
            }),
        }
    }

    async fn fetch_repository_by_full_name(
        &self,
        full_name: &str,
    ) -> Result<Option<RepositoryPayload>, GitHubError> {
        match self.repos_by_full_name.get(full_name) {
            Some(repo) => Ok(Some(repo.clone())),
            None => Err(GitHubError::Status {
                status: 404,
                body: "Not Found".to_string(),
            }),
        }
    }

    async fn fetch_issue(
        &self,
        full_name: &str,
        number: i32,
    ) -> Result<Option<IssuePayload>, GitHubError> {
        match self.issues_by_key.get(&(full_name.to_string(), number)) {
            Some(issue) => Ok(Some(issue.clone())),
            None => Err(GitHubError::Status {
                status: 404,
                body: "Not Found".to_string(),
            }),
        }
    }

    async fn fetch_repo_languages(&self, full_name: &str) -> Vec<String> {
        self.languages.get(full_name).cloned().unwrap_or_default()
    }
}

// ─── Fixtures ──────────────────────────────────────────────────────────────────

fn api_url(full_name: &str) -> String {
    format!("https://api.github.com/repos/{full_name}")
}

fn repo(github_id: i64, full_name: &str, stars: i32) -> RepositoryPayload {
    RepositoryPayload {
        id: github_id,
        name: full_name.split('/').next_back().unwrap().to_string(),
        full_name: full_name.to_string(),
        html_url: format!("https://github.com/{full_name}"),
        stargazers_count: stars,
        forks_count: 5,
        watchers_count: stars,
        language: Some("Rust".to_string()),
        created_at: Utc.with_ymd_and_hms(2019, 3, 1, 0, 0, 0).single(),
        updated_at: Utc.with_ymd_and_hms(2025, 5, 30, 0, 0, 0).single(),
    }
}

fn issue(github_id: i64, number: i32, repo_full_name: &str) -> IssuePayload {
    IssuePayload {
        id: github_id,
        number,
        title: format!("Issue #{number}"),
        html_url: format!("https://github.com/{repo_full_name}/issues/{number}"),
        repository_url: api_url(repo_full_name),
        state: IssueState::Open,
        comments: 1,
        created_at: Utc.with_ymd_and_hms(2025, 4, 10, 0, 0, 0).single(),
        updated_at: Utc.with_ymd_and_hms(2025, 5, 25, 0, 0, 0).single(),
        assignee: None,
        labels: vec![LabelPayload {
            name: "good first issue".to_string(),
            color: Some("7057ff".to_string()),
        }],
    }
}

async fn setup_db() -> DatabaseConnection {
    connect_and_migrate("sqlite::memory:")
        .await
        .expect("test db should migrate")
}

async fn metadata_status(db: &DatabaseConnection) -> RefreshStatus {
    store::get_metadata(db).await.unwrap().unwrap().status
}

// ─── Full Refresh ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_refresh_filters_by_star_threshold() {
    let db = setup_db().await;

    let popular = repo(10, "rust-lang/rust", 600);
    let unpopular = repo(11, "tiny/project", 499);

    let mut github = ScriptedGitHub {
        pages: vec![vec![
            issue(101, 1, "rust-lang/rust"),
            issue(102, 2, "rust-lang/rust"),
            issue(103, 3, "rust-lang/rust"),
            issue(104, 1, "tiny/project"),
            issue(105, 2, "tiny/project"),
        ]],
        total_count: 5,
        ..Default::default()
    };
    github
        .repos_by_url
        .insert(api_url("rust-lang/rust"), popular);
    github
        .repos_by_url
        .insert(api_url("tiny/project"), unpopular);
    github
        .languages
        .insert("rust-lang/rust".to_string(), vec!["Rust".to_string()]);

    let outcome = refresh_github_data(&db, &github, None).await;

    assert!(outcome.success, "outcome: {outcome:?}");
    assert_eq!(outcome.count, 3);
    assert_eq!(outcome.updated_count, 3);
    assert!(outcome.errors.is_empty());

    // Only the popular repository and its issues were persisted; the
    // below-threshold issues were dropped silently.
    assert_eq!(store::count_repositories(&db).await.unwrap(), 1);
    assert_eq!(store::count_issues(&db).await.unwrap(), 3);
    assert!(store::find_issue_by_github_id(&db, 104)
        .await
        .unwrap()
        .is_none());

    // total_count of 5 fits on one page, so the scan stopped there.
    assert_eq!(github.search_calls.load(Ordering::SeqCst), 1);
    assert_eq!(metadata_status(&db).await, RefreshStatus::Success);

    let stored = store::find_repository_by_github_id(&db, 10)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.language_list(), vec!["Rust"]);
}

#[tokio::test]
async fn test_full_refresh_records_repo_fetch_failures() {
    let db = setup_db().await;

    let mut github = ScriptedGitHub {
        pages: vec![vec![
            issue(201, 1, "ok/repo"),
            issue(202, 1, "broken/repo"),
        ]],
        total_count: 2,
        ..Default::default()
    };
    github.repos_by_url.insert(api_url("ok/repo"), repo(20, "ok/repo", 1000));
    github.failing_repo_urls.insert(api_url("broken/repo"));

    let outcome = refresh_github_data(&db, &github, None).await;

    assert!(!outcome.success);
    assert_eq!(outcome.count, 1);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(
        outcome.errors[0].id,
        format!("repo:{}", api_url("broken/repo"))
    );

    // The failed repository's issue was dropped, not errored twice.
    assert_eq!(store::count_issues(&db).await.unwrap(), 1);
    assert_eq!(
        metadata_status(&db).await,
        RefreshStatus::CompletedWithErrors
    );
}

#[tokio::test]
async fn test_full_refresh_dedups_issues_across_pages() {
    let db = setup_db().await;

    let mut github = ScriptedGitHub {
        pages: vec![
            vec![issue(301, 1, "org/repo"), issue(302, 2, "org/repo")],
            vec![issue(302, 2, "org/repo"), issue(303, 3, "org/repo")],
        ],
        // 150 results -> two pages to scan.
        total_count: 150,
        ..Default::default()
    };
    github.repos_by_url.insert(api_url("org/repo"), repo(30, "org/repo", 2000));

    let outcome = refresh_github_data(&db, &github, None).await;

    assert!(outcome.success);
    // Issue 302 appears on both pages but is processed once.
    assert_eq!(outcome.count, 3);
    assert_eq!(store::count_issues(&db).await.unwrap(), 3);
    assert_eq!(github.search_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_full_refresh_stops_on_empty_page() {
    let db = setup_db().await;

    let github = ScriptedGitHub {
        pages: Vec::new(),
        total_count: 0,
        ..Default::default()
    };

    let outcome = refresh_github_data(&db, &github, None).await;

    assert!(outcome.success);
    assert_eq!(outcome.count, 0);
    assert_eq!(github.search_calls.load(Ordering::SeqCst), 1);
    assert_eq!(metadata_status(&db).await, RefreshStatus::Success);
}

#[tokio::test]
async fn test_full_refresh_pauses_after_rate_limited_page() {
    let db = setup_db().await;

    let mut github = ScriptedGitHub {
        pages: vec![
            Vec::new(), // page 1 is scripted to rate-limit instead
            vec![issue(401, 1, "org/repo")],
        ],
        total_count: 1,
        ..Default::default()
    };
    github.rate_limited_pages.insert(1);
    github.repos_by_url.insert(api_url("org/repo"), repo(40, "org/repo", 800));

    let start = std::time::Instant::now();
    let outcome = refresh_github_data(&db, &github, None).await;

    // The rate-limited page is recorded as a page error, the pause is taken,
    // and the scan continues to the next page.
    assert!(!outcome.success);
    assert_eq!(outcome.count, 1);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].id, "page:1");
    assert!(start.elapsed() >= gleaner::sync::RATE_LIMIT_PAUSE);
    assert_eq!(store::count_issues(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_full_refresh_clears_flag_on_closed_issues_first() {
    let db = setup_db().await;

    // Seed a closed-but-still-flagged issue from an earlier run.
    let seeded_repo = repo(50, "org/repo", 900);
    let seeded_issue = issue(501, 1, "org/repo");
    store::save_data(&db, &seeded_repo, &[], Some(&seeded_issue))
        .await
        .unwrap();
    let stored = store::find_issue_by_github_id(&db, 501)
        .await
        .unwrap()
        .unwrap();
    let mut model: issue::ActiveModel = stored.into();
    model.state = Set(IssueState::Closed);
    model.update(&db).await.unwrap();

    let github = ScriptedGitHub {
        pages: Vec::new(),
        total_count: 0,
        ..Default::default()
    };

    let outcome = refresh_github_data(&db, &github, None).await;
    assert!(outcome.success);

    let cleaned = store::find_issue_by_github_id(&db, 501)
        .await
        .unwrap()
        .unwrap();
    assert!(!cleaned.is_good_first_issue);
}

// ─── Staleness Refresh ─────────────────────────────────────────────────────────

async fn backdate_issue(db: &DatabaseConnection, github_id: i64, updated_days_ago: i64) {
    let stored = store::find_issue_by_github_id(db, github_id)
        .await
        .unwrap()
        .unwrap();
    let mut model: issue::ActiveModel = stored.into();
    model.last_refreshed = Set(Some((Utc::now() - Duration::days(5)).fixed_offset()));
    model.updated_at = Set(Some(
        (Utc::now() - Duration::days(updated_days_ago)).fixed_offset(),
    ));
    model.update(db).await.unwrap();
}

#[tokio::test]
async fn test_stale_refresh_with_one_missing_upstream() {
    let db = setup_db().await;

    // Seed five stale issues in one repository.
    let seeded_repo = repo(60, "org/repo", 1500);
    for (github_id, number) in [(601i64, 1), (602, 2), (603, 3), (604, 4), (605, 5)] {
        let payload = issue(github_id, number, "org/repo");
        store::save_data(&db, &seeded_repo, &[], Some(&payload))
            .await
            .unwrap();
        backdate_issue(&db, github_id, 10 - i64::from(number)).await;
    }

    let mut github = ScriptedGitHub::default();
    github
        .repos_by_full_name
        .insert("org/repo".to_string(), repo(60, "org/repo", 1500));
    // Issue #3 has been deleted upstream; the other four re-fetch fine.
    for number in [1, 2, 4, 5] {
        github.issues_by_key.insert(
            ("org/repo".to_string(), number),
            issue(600 + i64::from(number), number, "org/repo"),
        );
    }

    let before = store::find_issue_by_github_id(&db, 603)
        .await
        .unwrap()
        .unwrap();

    let outcome = refresh_existing_issues(&db, &github, 2, 30, None).await;

    assert!(!outcome.success);
    assert_eq!(outcome.count, 4);
    assert_eq!(outcome.updated_count, 4);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].id, "603");
    assert_eq!(
        metadata_status(&db).await,
        RefreshStatus::CompletedWithErrors
    );

    // The missing item was left untouched for a future retry window.
    let after = store::find_issue_by_github_id(&db, 603)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.last_refreshed, before.last_refreshed);

    // The refreshed rows advanced.
    let refreshed = store::find_issue_by_github_id(&db, 601)
        .await
        .unwrap()
        .unwrap();
    assert!(refreshed.last_refreshed.unwrap() > before.last_refreshed.unwrap());
}

#[tokio::test]
async fn test_stale_refresh_with_nothing_stale() {
    let db = setup_db().await;

    let seeded_repo = repo(70, "org/repo", 1500);
    let payload = issue(701, 1, "org/repo");
    store::save_data(&db, &seeded_repo, &[], Some(&payload))
        .await
        .unwrap();

    let github = ScriptedGitHub::default();
    let outcome = refresh_existing_issues(&db, &github, 2, 30, None).await;

    assert!(outcome.success);
    assert_eq!(outcome.count, 0);
    assert_eq!(metadata_status(&db).await, RefreshStatus::Success);
}

#[tokio::test]
async fn test_operation_failure_is_captured_not_thrown() {
    let db = setup_db().await;

    // Wreck the schema so the staleness query itself fails.
    use sea_orm::ConnectionTrait;
    db.execute_unprepared("DROP TABLE issue_labels").await.unwrap();
    db.execute_unprepared("DROP TABLE issues").await.unwrap();

    let github = ScriptedGitHub::default();
    let outcome = refresh_existing_issues(&db, &github, 2, 30, None).await;

    assert!(!outcome.success);
    assert_eq!(outcome.count, 0);
    assert!(outcome.error.is_some());
    assert_eq!(metadata_status(&db).await, RefreshStatus::Error);
}
