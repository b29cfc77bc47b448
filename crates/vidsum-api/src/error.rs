//! API error types and HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use vidsum_gemini::GeminiError;
use vidsum_supabase::SupabaseError;
use vidsum_youtube::YoutubeError;

pub type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Youtube(#[from] YoutubeError),

    #[error(transparent)]
    Gemini(#[from] GeminiError),

    #[error(transparent)]
    Supabase(#[from] SupabaseError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Youtube(e) => match e {
                YoutubeError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
                YoutubeError::VideoNotFound(_)
                | YoutubeError::TranscriptUnavailable(_)
                | YoutubeError::NoRecommendations
                | YoutubeError::NoChannelVideos => StatusCode::NOT_FOUND,
                YoutubeError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                YoutubeError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            },
            ApiError::Gemini(e) => match e {
                GeminiError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            },
            ApiError::Supabase(e) => match e {
                SupabaseError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Machine-readable code for errors clients are expected to
    /// branch on. Most errors carry none.
    fn code(&self) -> Option<&'static str> {
        match self {
            ApiError::Youtube(YoutubeError::NoRecommendations) => Some("no_recommendations"),
            ApiError::Youtube(YoutubeError::NoChannelVideos) => Some("no_channel_videos"),
            ApiError::Youtube(YoutubeError::TranscriptUnavailable(_)) => {
                Some("transcript_unavailable")
            }
            _ => None,
        }
    }
}

// ============================================================================
// Response Conversion
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR
            && std::env::var("ENVIRONMENT").unwrap_or_default() == "production"
        {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            detail,
            code: self.code().map(str::to_string),
        };

        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Tests
// ============================================================================
