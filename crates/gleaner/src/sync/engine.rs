//! Refresh engine: full-refresh orchestration and staleness re-validation.
//!
//! Both entry points are generic over [`GitHubApi`] so tests can drive them
//! with a scripted client, and both are wrapped by the operation wrapper so
//! a scheduled job invoking them can never crash on a refresh failure.

use std::collections::{BTreeSet, HashMap, HashSet};

use futures::stream::{self, StreamExt};
use sea_orm::DatabaseConnection;

use crate::entity::refresh_status::RefreshStatus;
use crate::github::types::{IssuePayload, RepositoryPayload};
use crate::github::{GitHubApi, GitHubError};
use crate::store;

use super::batch::process_batch;
use super::operation::run_operation;
use super::progress::{ProgressCallback, SyncProgress, emit};
use super::types::{
    ItemError, MAX_ITEMS_OVERALL, MAX_PAGES, MIN_STALE_FETCH_LIMIT, MIN_STARS, RATE_LIMIT_PAUSE,
    REPO_FETCH_CONCURRENCY, RefreshOutcome, RefreshStats, SEARCH_PER_PAGE, SEARCH_QUERY,
    SyncError,
};

/// Discover and ingest new or updated open good-first-issues from
/// sufficiently popular repositories.
///
/// Scans up to [`super::types::MAX_PAGES`] pages of the search API, newest
/// updates first, ingesting each page through the batch processor. See the
/// module docs of [`crate::sync`] for the stop conditions and failure
/// semantics.
#[tracing::instrument(skip_all)]
pub async fn refresh_github_data<C: GitHubApi>(
    db: &DatabaseConnection,
    client: &C,
    on_progress: Option<&ProgressCallback>,
) -> RefreshOutcome {
    run_operation(
        db,
        RefreshStatus::Refreshing,
        run_full_refresh(db, client, on_progress),
    )
    .await
}

/// Re-validate previously ingested open good-first-issues whose last
/// refresh is older than `age_in_days`.
///
/// At most `max(batch_size, MIN_STALE_FETCH_LIMIT)` issues are selected,
/// oldest update first. Each is re-fetched (issue and repository detail
/// concurrently) and upserted; an item whose upstream data is gone is
/// recorded as an error and left untouched for a future run.
#[tracing::instrument(skip_all, fields(age_in_days, batch_size))]
pub async fn refresh_existing_issues<C: GitHubApi>(
    db: &DatabaseConnection,
    client: &C,
    age_in_days: u32,
    batch_size: u32,
    on_progress: Option<&ProgressCallback>,
) -> RefreshOutcome {
    run_operation(
        db,
        RefreshStatus::RefreshingExisting,
        run_existing_refresh(db, client, age_in_days, batch_size, on_progress),
    )
    .await
}

// ─── Full Refresh ────────────────────────────────────────────────────────────

/// Whether to continue with the next search page.
enum PageFlow {
    Continue,
    Stop,
}

async fn run_full_refresh<C: GitHubApi>(
    db: &DatabaseConnection,
    client: &C,
    on_progress: Option<&ProgressCallback>,
) -> Result<RefreshStats, SyncError> {
    // Closed issues must stop surfacing before their repositories are
    // re-evaluated; a failure here is logged but never blocks ingestion.
    match store::clear_flag_on_closed_issues(db).await {
        Ok(cleared) => {
            tracing::debug!(cleared, "Cleared good-first-issue flag on non-open issues");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Closed-issue cleanup failed, continuing with refresh");
        }
    }

    let mut stats = RefreshStats::default();
    // Run-scoped dedup: the same issue can reappear across pages when
    // upstream ordering shifts mid-scan. Separate invocations re-observe
    // issues deliberately; the upsert is idempotent.
    let mut seen = HashSet::new();

    let mut page = 1u32;
    while page <= MAX_PAGES && stats.processed < MAX_ITEMS_OVERALL {
        emit(on_progress, SyncProgress::FetchingPage { page });

        match process_page(db, client, page, &mut seen, &mut stats, on_progress).await {
            Ok(PageFlow::Continue) => {}
            Ok(PageFlow::Stop) => break,
            Err(e) => {
                tracing::error!(page, error = %e, "Search page failed");
                stats
                    .errors
                    .push(ItemError::new(format!("page:{page}"), e.to_string()));

                if e.is_rate_limit() {
                    tracing::warn!(page, "Rate limit hit, pausing before next page");
                    emit(
                        on_progress,
                        SyncProgress::RateLimitPause {
                            page,
                            pause_ms: RATE_LIMIT_PAUSE.as_millis() as u64,
                        },
                    );
                    tokio::time::sleep(RATE_LIMIT_PAUSE).await;
                }
            }
        }

        page += 1;
    }

    emit(
        on_progress,
        SyncProgress::OperationFinished {
            processed: stats.processed,
            updated: stats.updated_count,
            errors: stats.errors.len(),
        },
    );

    Ok(stats)
}

async fn process_page<C: GitHubApi>(
    db: &DatabaseConnection,
    client: &C,
    page: u32,
    seen: &mut HashSet<i64>,
    stats: &mut RefreshStats,
    on_progress: Option<&ProgressCallback>,
) -> Result<PageFlow, SyncError> {
    let results = client
        .search_issues(SEARCH_QUERY, page, SEARCH_PER_PAGE)
        .await?;

    if results.items.is_empty() {
        tracing::debug!(page, "No more issues in search results");
        return Ok(PageFlow::Stop);
    }

    emit(
        on_progress,
        SyncProgress::PageFetched {
            page,
            count: results.items.len(),
            total_count: results.total_count,
        },
    );

    // Skip issues already ingested this run; collect the distinct set of
    // owning repositories the rest reference.
    let mut repo_urls = BTreeSet::new();
    let mut candidates = Vec::new();
    for issue in results.items {
        if seen.contains(&issue.id) {
            continue;
        }
        repo_urls.insert(issue.repository_url.clone());
        candidates.push(issue);
    }

    if candidates.is_empty() {
        tracing::debug!(page, "No new issues on this page");
        return Ok(PageFlow::Continue);
    }

    let repos = fetch_repositories(client, repo_urls, stats, on_progress).await;

    // Star-threshold filter. Issues whose repository lookup failed or whose
    // repository is not popular enough are dropped without an error entry.
    let mut retained: Vec<(IssuePayload, RepositoryPayload)> = Vec::new();
    let mut dropped = 0usize;
    for issue in candidates {
        match repos.get(&issue.repository_url) {
            Some(repo) if repo.stargazers_count >= MIN_STARS => {
                seen.insert(issue.id);
                retained.push((issue, repo.clone()));
            }
            _ => dropped += 1,
        }
    }

    emit(
        on_progress,
        SyncProgress::PageFiltered {
            page,
            retained: retained.len(),
            dropped,
        },
    );

    if retained.is_empty() {
        tracing::debug!(page, "No issues met the criteria after filtering");
        return Ok(PageFlow::Continue);
    }

    let batch = process_batch(
        retained,
        |(issue, _)| issue.id.to_string(),
        move |(issue, repo)| async move {
            let languages = client.fetch_repo_languages(&repo.full_name).await;
            store::save_data(db, &repo, &languages, Some(&issue)).await?;
            Ok::<bool, store::StoreError>(true)
        },
    )
    .await;

    emit(
        on_progress,
        SyncProgress::BatchCompleted {
            processed: batch.processed,
            updated: batch.updated_count,
            errors: batch.errors.len(),
        },
    );
    stats.merge(batch);

    if stats.processed >= MAX_ITEMS_OVERALL {
        tracing::info!(
            limit = MAX_ITEMS_OVERALL,
            "Reached overall processing limit"
        );
        return Ok(PageFlow::Stop);
    }

    // The search API serves at most 1000 results; stop once the reported
    // total has been paged through.
    if results.total_count > 0 {
        let available_pages =
            (results.total_count.min(1000)).div_ceil(u64::from(SEARCH_PER_PAGE)) as u32;
        if page >= available_pages {
            tracing::debug!(page, available_pages, "All available search pages scanned");
            return Ok(PageFlow::Stop);
        }
    }

    Ok(PageFlow::Continue)
}

/// Fetch each distinct repository URL exactly once, with bounded fan-out.
///
/// Failed lookups are recorded into `stats` and the repository is simply
/// absent from the returned map; other lookups proceed regardless.
async fn fetch_repositories<C: GitHubApi>(
    client: &C,
    repo_urls: BTreeSet<String>,
    stats: &mut RefreshStats,
    on_progress: Option<&ProgressCallback>,
) -> HashMap<String, RepositoryPayload> {
    let requested = repo_urls.len();

    let outcomes: Vec<(String, Result<Option<RepositoryPayload>, GitHubError>)> =
        stream::iter(repo_urls)
            .map(|url| async move {
                let result = client.fetch_repository(&url).await;
                (url, result)
            })
            .buffer_unordered(REPO_FETCH_CONCURRENCY)
            .collect()
            .await;

    let mut repos = HashMap::new();
    for (url, result) in outcomes {
        match result {
            Ok(Some(repo)) => {
                repos.insert(url, repo);
            }
            Ok(None) => {
                tracing::warn!(url = %url, "Repository fetch returned no content");
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Repository fetch failed");
                stats.errors.push(ItemError::new(
                    format!("repo:{url}"),
                    format!("Repository fetch failed: {e}"),
                ));
            }
        }
    }

    emit(
        on_progress,
        SyncProgress::RepositoriesFetched {
            requested,
            fetched: repos.len(),
        },
    );

    repos
}

// ─── Staleness Refresh ───────────────────────────────────────────────────────

async fn run_existing_refresh<C: GitHubApi>(
    db: &DatabaseConnection,
    client: &C,
    age_in_days: u32,
    batch_size: u32,
    on_progress: Option<&ProgressCallback>,
) -> Result<RefreshStats, SyncError> {
    let limit = u64::from(batch_size.max(MIN_STALE_FETCH_LIMIT));

    let stale = store::find_stale_issues(db, age_in_days, limit).await?;
    if stale.is_empty() {
        tracing::info!("No stale issues found to refresh");
        return Ok(RefreshStats::default());
    }

    tracing::info!(count = stale.len(), age_in_days, "Refreshing stale issues");
    emit(on_progress, SyncProgress::StaleSelected { count: stale.len() });

    let stats = process_batch(
        stale,
        |stale| stale.github_id.to_string(),
        move |stale| async move {
            let target = format!("{}#{}", stale.full_name, stale.number);

            let (issue_result, repo_result) = tokio::join!(
                client.fetch_issue(&stale.full_name, stale.number),
                client.fetch_repository_by_full_name(&stale.full_name),
            );

            let issue = issue_result.map_err(|source| SyncError::Refetch {
                what: "issue",
                target: target.clone(),
                source,
            })?;
            let repo = repo_result.map_err(|source| SyncError::Refetch {
                what: "repository",
                target: stale.full_name.clone(),
                source,
            })?;

            let (Some(issue), Some(repo)) = (issue, repo) else {
                tracing::warn!(target = %target, "Issue or repository gone upstream, skipping");
                return Err(SyncError::MissingUpstream { target });
            };

            let languages = client.fetch_repo_languages(&repo.full_name).await;
            store::save_data(db, &repo, &languages, Some(&issue)).await?;
            Ok(true)
        },
    )
    .await;

    emit(
        on_progress,
        SyncProgress::OperationFinished {
            processed: stats.processed,
            updated: stats.updated_count,
            errors: stats.errors.len(),
        },
    );

    Ok(stats)
}
