//! Stored summary rows for the `video_summaries` table.

use crate::language::Language;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input for saving a freshly generated summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSummary {
    /// Id of the first source video, used as the representative key.
    pub video_id: String,
    pub title: String,
    pub summary: String,
    pub language: Language,
    /// Source URLs in input order; comma-joined when stored.
    pub source_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl NewSummary {
    /// The comma-joined form stored in the `source_urls` column.
    pub fn joined_source_urls(&self) -> String {
        self.source_urls.join(",")
    }
}

/// A persisted summary as returned by the store.
///
/// Identity is the auto-assigned integer `id`. Rows are never updated;
/// they are created once and removed by explicit delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSummary {
    pub id: i64,
    pub video_id: String,
    pub title: String,
    pub summary: String,
    pub language: Language,
    /// UTC creation instant, set at save time.
    pub timestamp: DateTime<Utc>,
    /// Comma-joined source URLs, as stored.
    pub source_urls: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl StoredSummary {
    /// Split the stored `source_urls` column back into individual URLs.
    pub fn source_url_list(&self) -> Vec<String> {
        self.source_urls
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    }
}
