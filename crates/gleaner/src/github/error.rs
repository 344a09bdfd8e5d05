//! GitHub API error types.

use thiserror::Error;

/// Errors that can occur when talking to the GitHub REST API.
///
/// The client performs no retries; callers decide how to react to each
/// variant (record, pause, or drop the item).
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Non-success HTTP response, carrying the status and response body.
    #[error("GitHub API error: {status} {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response (connect failure, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The response body could not be parsed as the expected JSON shape.
    #[error("JSON parse error: {0}")]
    Decode(String),

    /// Unexpected/internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GitHubError {
    /// Check if this error indicates GitHub rate limiting.
    ///
    /// GitHub reports primary and secondary rate limits as 403 or 429 with a
    /// "rate limit" phrase in the body.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            GitHubError::Status { status, body } => {
                matches!(status, 403 | 429) || body.to_ascii_lowercase().contains("rate limit")
            }
            _ => false,
        }
    }

    /// Check if this error is an upstream not-found (resource removed or
    /// never existed).
    pub fn is_not_found(&self) -> bool {
        matches!(self, GitHubError::Status { status: 404, .. })
    }
}
