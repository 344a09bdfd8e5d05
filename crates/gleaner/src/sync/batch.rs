//! Bounded-concurrency batch processing with per-item failure isolation.

use futures::future::join_all;

use super::types::{BATCH_PAUSE, BATCH_SIZE, ItemError, RefreshStats};

/// Process `items` in fixed-size concurrent groups.
///
/// Each group of [`BATCH_SIZE`] items runs concurrently and is awaited in
/// full before the next group starts, bounding peak external-API concurrency;
/// a short [`BATCH_PAUSE`] separates groups to smooth request bursts.
///
/// Every item's outcome is captured independently: `Ok(updated)` increments
/// `processed` (and `updated_count` when `updated` is true); `Err` appends an
/// [`ItemError`] keyed by `id_of(item)`. One item failing never aborts the
/// group or the batch, so for N items `processed + errors.len() == N`.
pub async fn process_batch<T, I, F, Fut, E>(
    items: Vec<T>,
    id_of: I,
    processor: F,
) -> RefreshStats
where
    I: Fn(&T) -> String,
    F: Fn(T) -> Fut,
    Fut: std::future::Future<Output = Result<bool, E>>,
    E: std::fmt::Display,
{
    let mut stats = RefreshStats::default();
    let mut queue = items;

    while !queue.is_empty() {
        let tail = queue.split_off(queue.len().min(BATCH_SIZE));
        let group = std::mem::replace(&mut queue, tail);

        let group_futures = group.into_iter().map(|item| {
            let id = id_of(&item);
            let future = processor(item);
            async move { (id, future.await) }
        });

        for (id, result) in join_all(group_futures).await {
            match result {
                Ok(updated) => {
                    stats.processed += 1;
                    if updated {
                        stats.updated_count += 1;
                    }
                }
                Err(e) => {
                    stats.errors.push(ItemError::new(id, e.to_string()));
                }
            }
        }

        if !queue.is_empty() {
            tokio::time::sleep(BATCH_PAUSE).await;
        }
    }

    stats
}
