//! Error types for Supabase persistence.

use thiserror::Error;

pub type SupabaseResult<T> = Result<T, SupabaseError>;

/// Errors from the Supabase REST client.
#[derive(Error, Debug)]
pub enum SupabaseError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("rate limited, retry after {0}ms")]
    RateLimited(u64),

    #[error("summary not found: {0}")]
    NotFound(String),

    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl SupabaseError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::RequestFailed(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Map an HTTP status to the matching error variant.
    pub fn from_http_status(status: u16, message: String) -> Self {
        match status {
            429 => Self::RateLimited(1000),
            500..=599 => Self::ServerError(status, message),
            _ => Self::RequestFailed(message),
        }
    }

    /// Whether the operation that produced this error is safe to retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimited(_) | Self::ServerError(_, _)
        )
    }

    /// HTTP status to report for this error, if one applies.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::ServerError(status, _) => Some(*status),
            Self::RateLimited(_) => Some(429),
            Self::NotFound(_) => Some(404),
            Self::RequestFailed(_) => Some(400),
            _ => None,
        }
    }

    /// Suggested retry delay from a rate-limit response.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimited(ms) => Some(*ms),
            _ => None,
        }
    }
}
