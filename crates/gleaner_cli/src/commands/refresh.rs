//! The refresh commands: full pipeline and staleness-only.

use gleaner::cache::{CacheInvalidator, NoopCacheInvalidator};
use gleaner::{GitHubClient, RefreshOutcome, db, refresh_existing_issues, refresh_github_data};

use crate::config::Config;
use crate::progress::logging_callback;

/// Run the full refresh pipeline: discover new issues, re-validate stale
/// ones, then clear derived caches. Mirrors the scheduled-job entry point.
pub(crate) async fn handle_refresh(
    config: &Config,
    database_url: &str,
    skip_new: bool,
    skip_existing: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect_and_migrate(database_url).await?;
    let client = GitHubClient::new(config.github_token().as_deref())?;
    let progress = logging_callback();

    let mut failed = false;

    if !skip_new {
        let outcome = refresh_github_data(&db, &client, Some(&progress)).await;
        report_outcome("full refresh", &outcome);
        failed |= !outcome.success;
    }

    if !skip_existing {
        let outcome = refresh_existing_issues(
            &db,
            &client,
            config.refresh.stale_age_days,
            config.refresh.stale_batch_size,
            Some(&progress),
        )
        .await;
        report_outcome("staleness refresh", &outcome);
        failed |= !outcome.success;
    }

    invalidate_caches().await;

    db.close().await?;

    if failed {
        return Err("refresh completed with failures (see metadata for detail)".into());
    }
    Ok(())
}

/// Run only the staleness refresh, with optional overrides.
pub(crate) async fn handle_refresh_existing(
    config: &Config,
    database_url: &str,
    age_days: Option<u32>,
    batch_size: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect_and_migrate(database_url).await?;
    let client = GitHubClient::new(config.github_token().as_deref())?;
    let progress = logging_callback();

    let outcome = refresh_existing_issues(
        &db,
        &client,
        age_days.unwrap_or(config.refresh.stale_age_days),
        batch_size.unwrap_or(config.refresh.stale_batch_size),
        Some(&progress),
    )
    .await;
    report_outcome("staleness refresh", &outcome);

    invalidate_caches().await;

    db.close().await?;

    if !outcome.success {
        return Err("refresh completed with failures (see metadata for detail)".into());
    }
    Ok(())
}

/// Clear derived response caches, fire-and-forget.
async fn invalidate_caches() {
    let invalidator = NoopCacheInvalidator;
    if let Err(e) = invalidator.invalidate_api_caches().await {
        tracing::warn!(error = %e, "Cache invalidation failed");
    }
}

fn report_outcome(operation: &str, outcome: &RefreshOutcome) {
    if let Some(error) = &outcome.error {
        tracing::error!(operation, error = %error, "Operation failed");
        return;
    }

    tracing::info!(
        operation,
        processed = outcome.count,
        updated = outcome.updated_count,
        errors = outcome.errors.len(),
        "Operation summary"
    );

    // Surface a sample of per-item errors; the full list is in metadata.
    for item in outcome.errors.iter().take(3) {
        tracing::warn!(id = %item.id, error = %item.error, "Item failed");
    }
    if outcome.errors.len() > 3 {
        tracing::warn!(additional = outcome.errors.len() - 3, "More item failures omitted");
    }
}
