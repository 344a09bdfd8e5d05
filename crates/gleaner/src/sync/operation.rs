//! Operation wrapper: metadata bracketing and uniform outcome shaping.
//!
//! Refresh operations are invoked by scheduled jobs that must never crash,
//! so every failure mode is folded into the returned [`RefreshOutcome`] and
//! the metadata record; nothing propagates out of this module.

use sea_orm::DatabaseConnection;

use crate::entity::refresh_status::RefreshStatus;
use crate::store;

use super::types::{RefreshOutcome, RefreshStats, SyncError};

/// Run a refresh operation bracketed by metadata writes.
///
/// Records `status` at the start, runs the operation, then writes the final
/// status: `success` when no per-item errors were recorded, otherwise
/// `completed_with_errors` with the JSON-serialized error list. An error
/// escaping the operation itself is recorded as status `error` and returned
/// as a failed outcome instead of being rethrown.
///
/// Metadata write failures are logged and otherwise ignored; the refresh
/// result matters more than the bookkeeping row.
pub(crate) async fn run_operation<Fut>(
    db: &DatabaseConnection,
    status: RefreshStatus,
    operation: Fut,
) -> RefreshOutcome
where
    Fut: std::future::Future<Output = Result<RefreshStats, SyncError>>,
{
    tracing::info!(operation = %status, "Starting refresh operation");

    if let Err(e) = store::update_metadata(db, status, None).await {
        tracing::warn!(error = %e, "Failed to record operation start in metadata");
    }

    match operation.await {
        Ok(stats) => {
            tracing::info!(
                operation = %status,
                processed = stats.processed,
                errors = stats.errors.len(),
                "Finished refresh operation"
            );
            finish_operation(db, stats).await
        }
        Err(e) => {
            tracing::error!(operation = %status, error = %e, "Refresh operation failed");
            let message = e.to_string();

            if let Err(meta_err) =
                store::update_metadata(db, RefreshStatus::Error, Some(message.clone())).await
            {
                tracing::warn!(error = %meta_err, "Failed to record operation failure in metadata");
            }

            RefreshOutcome {
                success: false,
                count: 0,
                updated_count: 0,
                errors: Vec::new(),
                error: Some(message),
            }
        }
    }
}

async fn finish_operation(db: &DatabaseConnection, stats: RefreshStats) -> RefreshOutcome {
    let status = if stats.errors.is_empty() {
        RefreshStatus::Success
    } else {
        RefreshStatus::CompletedWithErrors
    };

    let detail = if stats.errors.is_empty() {
        None
    } else {
        Some(
            serde_json::to_string(&stats.errors)
                .unwrap_or_else(|e| format!("failed to serialize error list: {e}")),
        )
    };

    if let Err(e) = store::update_metadata(db, status, detail).await {
        tracing::warn!(error = %e, "Failed to record operation result in metadata");
    }

    RefreshOutcome {
        success: status == RefreshStatus::Success,
        count: stats.processed,
        updated_count: stats.updated_count,
        errors: stats.errors,
        error: None,
    }
}
