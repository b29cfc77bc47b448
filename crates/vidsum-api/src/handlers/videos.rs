//! Video discovery handlers.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use vidsum_models::RecommendedVideo;

use crate::error::ApiResult;
use crate::state::AppState;

/// Upper bound the Data API accepts for search page sizes.
const MAX_SEARCH_RESULTS: u32 = 50;

/// Query parameters naming the seed video.
#[derive(Debug, Deserialize)]
pub struct SeedVideoQuery {
    /// Any supported YouTube URL form.
    pub url: String,
    /// Item count override. Falls back to the client default.
    pub max_results: Option<u32>,
}

impl SeedVideoQuery {
    fn max_results_or(&self, default: u32) -> u32 {
        self.max_results
            .unwrap_or(default)
            .clamp(1, MAX_SEARCH_RESULTS)
    }
}

/// Response body for both discovery endpoints.
#[derive(Debug, Serialize)]
pub struct RecommendedVideosResponse {
    pub videos: Vec<RecommendedVideo>,
    pub count: usize,
}

/// GET /api/videos/related
///
/// Related videos for the given seed URL. Returns 404 with code
/// `no_recommendations` when the search comes back empty.
pub async fn related_videos(
    State(state): State<AppState>,
    Query(query): Query<SeedVideoQuery>,
) -> ApiResult<Json<RecommendedVideosResponse>> {
    let max_results = query.max_results_or(state.youtube.default_max_results());
    let videos = state.youtube.related_for_url(&query.url, max_results).await?;

    info!(count = videos.len(), "related videos fetched");
    Ok(Json(RecommendedVideosResponse {
        count: videos.len(),
        videos,
    }))
}

/// GET /api/videos/channel-latest
///
/// Latest uploads from the seed video's channel, excluding the seed
/// itself. Returns 404 with code `no_channel_videos` when nothing else
/// is on the channel.
pub async fn channel_latest(
    State(state): State<AppState>,
    Query(query): Query<SeedVideoQuery>,
) -> ApiResult<Json<RecommendedVideosResponse>> {
    let max_results = query.max_results_or(state.youtube.default_max_results());
    let videos = state.youtube.channel_latest(&query.url, max_results).await?;

    info!(count = videos.len(), "channel videos fetched");
    Ok(Json(RecommendedVideosResponse {
        count: videos.len(),
        videos,
    }))
}
