//! Cache invalidation seam.
//!
//! The serving stack caches API responses (issue listings, metadata, filter
//! options); after a refresh run those entries are stale and must be
//! cleared. The cache itself belongs to the serving stack, so the pipeline
//! only carries the seam: the hosting process supplies an implementation
//! and invokes it fire-and-forget after a run. A failed invalidation is
//! logged, never rolled back, and never fails the refresh.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a cache invalidation backend.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend rejected or failed the invalidation.
    #[error("Cache backend error: {message}")]
    Backend { message: String },
}

impl CacheError {
    /// Create a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Clears cached API responses derived from the harvested data.
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    /// Clear every cache entry whose content a refresh run may have changed.
    async fn invalidate_api_caches(&self) -> Result<(), CacheError>;
}

/// No-op invalidator for deployments without a response cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCacheInvalidator;

#[async_trait]
impl CacheInvalidator for NoopCacheInvalidator {
    async fn invalidate_api_caches(&self) -> Result<(), CacheError> {
        tracing::debug!("No cache backend configured, skipping invalidation");
        Ok(())
    }
}
