//! Per-video types flowing through the ingestion pipeline.

use serde::{Deserialize, Serialize};

/// A raw input URL paired with the video id extracted from it.
///
/// Transient: created by the extractor, discarded after the pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    pub raw_url: String,
    pub video_id: String,
}

impl VideoRef {
    pub fn new(raw_url: impl Into<String>, video_id: impl Into<String>) -> Self {
        Self {
            raw_url: raw_url.into(),
            video_id: video_id.into(),
        }
    }
}

/// Successfully fetched video content: metadata plus transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSource {
    pub url: String,
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub transcript: String,
    /// Channel the video belongs to, when the snippet carried it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    /// Default-quality thumbnail, used when persisting a summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// Outcome of ingesting one URL: either the fetched content or the error
/// that stopped it. One record per input URL, same order as the input.
///
/// Failures are data here, not propagated errors. A bad video never aborts
/// the rest of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum VideoRecord {
    Fetched(VideoSource),
    Failed { url: String, error: String },
}

impl VideoRecord {
    /// Build a failure record from any displayable error.
    pub fn failed(url: impl Into<String>, error: impl ToString) -> Self {
        VideoRecord::Failed {
            url: url.into(),
            error: error.to_string(),
        }
    }

    /// The input URL this record was produced from.
    pub fn url(&self) -> &str {
        match self {
            VideoRecord::Fetched(source) => &source.url,
            VideoRecord::Failed { url, .. } => url,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, VideoRecord::Failed { .. })
    }

    /// The fetched content, if this record succeeded.
    pub fn as_source(&self) -> Option<&VideoSource> {
        match self {
            VideoRecord::Fetched(source) => Some(source),
            VideoRecord::Failed { .. } => None,
        }
    }

    /// The error message, if this record failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            VideoRecord::Fetched(_) => None,
            VideoRecord::Failed { error, .. } => Some(error),
        }
    }
}

/// A related or channel-latest video surfaced next to the generated text.
/// Read-only; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedVideo {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}
