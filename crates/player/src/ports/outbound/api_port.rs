//! Errors surfaced by the story engine boundary

use std::time::Duration;

/// Failure of a single story engine request.
///
/// Rendered verbatim into the combat log, so the `Display` output is
/// player-facing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ApiError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Bound `request` by `limit`, folding an elapsed deadline into [`ApiError::Timeout`].
pub async fn with_timeout<T, F>(limit: Duration, request: F) -> Result<T, ApiError>
where
    F: std::future::Future<Output = Result<T, ApiError>>,
{
    match tokio::time::timeout(limit, request).await {
        Ok(result) => result,
        Err(_) => {
            tracing::debug!(timeout_ms = %limit.as_millis(), "Story engine request timed out");
            Err(ApiError::Timeout(limit))
        }
    }
}
