//! YouTube Data API v3 client.
//!
//! Covers the three read paths the service needs: video snippets,
//! related-video search and channel listings. Transcript retrieval lives
//! in [`crate::transcript`] and rides on the same HTTP client.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;
use vidsum_models::{extract_video_id, RecommendedVideo};

use crate::error::{YoutubeError, YoutubeResult};
use crate::retry::{with_retry, RetryConfig};

const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const DEFAULT_WATCH_BASE_URL: &str = "https://www.youtube.com";

// =============================================================================
// Configuration
// =============================================================================

/// YouTube client configuration.
#[derive(Debug, Clone)]
pub struct YoutubeConfig {
    /// Data API v3 key.
    pub api_key: String,
    /// Data API base URL, overridable for tests.
    pub api_base_url: String,
    /// Watch-page base URL used by the transcript fetcher.
    pub watch_base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Default item count for search/listing calls.
    pub max_results: u32,
    /// Retry configuration.
    pub retry: RetryConfig,
}

impl YoutubeConfig {
    /// Create config from environment variables.
    pub fn from_env() -> YoutubeResult<Self> {
        let api_key = std::env::var("YOUTUBE_API_KEY").map_err(|_| YoutubeError::MissingApiKey)?;
        if api_key.is_empty() {
            return Err(YoutubeError::MissingApiKey);
        }

        let timeout_secs: u64 = std::env::var("YOUTUBE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let connect_timeout_secs: u64 = std::env::var("YOUTUBE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let max_results: u32 = std::env::var("YOUTUBE_MAX_RESULTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            api_key,
            api_base_url: std::env::var("YOUTUBE_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            watch_base_url: std::env::var("YOUTUBE_WATCH_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_WATCH_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            max_results,
            retry: RetryConfig::from_env(),
        })
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Snippet-level metadata for one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDetails {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub channel_id: Option<String>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    channel_id: Option<String>,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    #[serde(default)]
    default: Option<Thumbnail>,
    #[serde(default)]
    medium: Option<Thumbnail>,
    #[serde(default)]
    high: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl Thumbnails {
    fn best_url(self) -> Option<String> {
        self.default
            .or(self.medium)
            .or(self.high)
            .map(|t| t.url)
    }
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    #[serde(default)]
    video_id: Option<String>,
}

fn search_item_to_video(item: SearchItem) -> Option<RecommendedVideo> {
    let id = item.id.video_id?;
    Some(RecommendedVideo {
        id,
        title: item.snippet.title,
        thumbnail_url: item.snippet.thumbnails.best_url(),
    })
}

// =============================================================================
// Client
// =============================================================================

/// YouTube Data API client.
#[derive(Clone)]
pub struct YoutubeClient {
    pub(crate) http: Client,
    pub(crate) config: YoutubeConfig,
}

impl YoutubeClient {
    /// Create a new client with tuned HTTP settings.
    pub fn new(config: YoutubeConfig) -> YoutubeResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("vidsum-youtube/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(YoutubeError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> YoutubeResult<Self> {
        Self::new(YoutubeConfig::from_env()?)
    }

    /// Default item count for search/listing calls.
    pub fn default_max_results(&self) -> u32 {
        self.config.max_results
    }

    /// Fetch snippet metadata for one video.
    pub async fn video_details(&self, video_id: &str) -> YoutubeResult<VideoDetails> {
        let url = format!("{}/videos", self.config.api_base_url);
        let query = [
            ("part", "snippet".to_string()),
            ("id", video_id.to_string()),
            ("key", self.config.api_key.clone()),
        ];

        with_retry(&self.config.retry, "video_details", || async {
            let list: VideoListResponse = self.get_json("video_details", &url, &query).await?;
            let item = list
                .items
                .into_iter()
                .next()
                .ok_or_else(|| YoutubeError::video_not_found(video_id))?;

            debug!(video_id = %item.id, title = %item.snippet.title, "fetched video snippet");

            Ok(VideoDetails {
                video_id: item.id,
                title: item.snippet.title,
                description: item.snippet.description,
                channel_id: item.snippet.channel_id,
                thumbnail_url: item.snippet.thumbnails.best_url(),
            })
        })
        .await
    }

    /// Search for videos related to the given one.
    pub async fn related_videos(
        &self,
        video_id: &str,
        max_results: u32,
    ) -> YoutubeResult<Vec<RecommendedVideo>> {
        let url = format!("{}/search", self.config.api_base_url);
        let query = [
            ("part", "snippet".to_string()),
            ("relatedToVideoId", video_id.to_string()),
            ("type", "video".to_string()),
            ("maxResults", max_results.to_string()),
            ("key", self.config.api_key.clone()),
        ];

        let items = with_retry(&self.config.retry, "related_videos", || async {
            let list: SearchListResponse = self.get_json("related_videos", &url, &query).await?;
            Ok(list.items)
        })
        .await?;

        let videos: Vec<RecommendedVideo> =
            items.into_iter().filter_map(search_item_to_video).collect();
        if videos.is_empty() {
            return Err(YoutubeError::NoRecommendations);
        }
        Ok(videos)
    }

    /// List a channel's videos, newest first.
    pub async fn channel_videos(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> YoutubeResult<Vec<RecommendedVideo>> {
        let url = format!("{}/search", self.config.api_base_url);
        let query = [
            ("part", "snippet".to_string()),
            ("channelId", channel_id.to_string()),
            ("order", "date".to_string()),
            ("type", "video".to_string()),
            ("maxResults", max_results.to_string()),
            ("key", self.config.api_key.clone()),
        ];

        let items = with_retry(&self.config.retry, "channel_videos", || async {
            let list: SearchListResponse = self.get_json("channel_videos", &url, &query).await?;
            Ok(list.items)
        })
        .await?;

        Ok(items.into_iter().filter_map(search_item_to_video).collect())
    }

    /// Related videos for a seed URL. Fails with `InvalidUrl` on a bad seed,
    /// `NoRecommendations` when the upstream has nothing to offer.
    pub async fn related_for_url(
        &self,
        seed_url: &str,
        max_results: u32,
    ) -> YoutubeResult<Vec<RecommendedVideo>> {
        let seed_id = extract_video_id(seed_url)?;
        self.related_videos(&seed_id, max_results).await
    }

    /// Latest videos from the seed URL's channel, newest first, with the
    /// seed itself excluded (id compared case-insensitively).
    pub async fn channel_latest(
        &self,
        seed_url: &str,
        max_results: u32,
    ) -> YoutubeResult<Vec<RecommendedVideo>> {
        let seed_id = extract_video_id(seed_url)?;
        let details = self.video_details(&seed_id).await?;
        let channel_id = details.channel_id.ok_or(YoutubeError::NoChannelVideos)?;
        self.latest_from_channel(&channel_id, &seed_id, max_results)
            .await
    }

    /// Latest videos from a known channel with one video id excluded. Used
    /// when the caller already holds the seed's channel id and wants to skip
    /// the extra snippet lookup.
    pub async fn latest_from_channel(
        &self,
        channel_id: &str,
        exclude_video_id: &str,
        max_results: u32,
    ) -> YoutubeResult<Vec<RecommendedVideo>> {
        let videos: Vec<RecommendedVideo> = self
            .channel_videos(channel_id, max_results)
            .await?
            .into_iter()
            .filter(|v| !v.id.eq_ignore_ascii_case(exclude_video_id))
            .collect();

        if videos.is_empty() {
            return Err(YoutubeError::NoChannelVideos);
        }
        Ok(videos)
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> YoutubeResult<T> {
        let response = self.http.get(url).query(query).send().await?;
        let response = Self::check_response(operation, response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| YoutubeError::parse(format!("{operation}: {e}")))
    }

    pub(crate) async fn check_response(
        operation: &str,
        response: Response,
    ) -> YoutubeResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after_ms = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(|secs| secs * 1000);
        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(YoutubeError::RateLimited(retry_after_ms.unwrap_or(1000)));
        }
        Err(YoutubeError::from_http_status(
            status.as_u16(),
            format!("{operation} failed: {body}"),
        ))
    }
}

// =============================================================================
// Tests
// =============================================================================
