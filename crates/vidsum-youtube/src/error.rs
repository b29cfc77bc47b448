//! YouTube client error types.

use thiserror::Error;
use vidsum_models::VideoUrlError;

/// Result type for YouTube operations.
pub type YoutubeResult<T> = Result<T, YoutubeError>;

/// Errors that can occur while talking to YouTube.
#[derive(Debug, Error)]
pub enum YoutubeError {
    #[error("invalid video URL: {0}")]
    InvalidUrl(#[from] VideoUrlError),

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("no transcript available for video {0}")]
    TranscriptUnavailable(String),

    #[error("no related videos found")]
    NoRecommendations,

    #[error("no other videos found on the channel")]
    NoChannelVideos,

    #[error("YOUTUBE_API_KEY must be set")]
    MissingApiKey,

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("rate limited, retry after {0}ms")]
    RateLimited(u64),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    Parse(String),
}

impl YoutubeError {
    pub fn video_not_found(id: impl Into<String>) -> Self {
        Self::VideoNotFound(id.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Map an HTTP status to the matching error variant.
    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            429 => Self::RateLimited(1000),
            s if s >= 500 => Self::ServerError(s, message.into()),
            _ => Self::RequestFailed(message.into()),
        }
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            YoutubeError::Network(_) | YoutubeError::RateLimited(_) | YoutubeError::ServerError(..)
        )
    }

    /// HTTP status this error corresponds to, when it has one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            YoutubeError::RateLimited(_) => Some(429),
            YoutubeError::ServerError(status, _) => Some(*status),
            YoutubeError::VideoNotFound(_) => Some(404),
            _ => None,
        }
    }

    /// Server-requested retry delay, when one was given.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            YoutubeError::RateLimited(ms) => Some(*ms),
            _ => None,
        }
    }
}
