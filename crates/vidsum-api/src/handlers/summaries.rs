//! Summary generation, browsing, and deletion handlers.

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use vidsum_gemini::build_prompt;
use vidsum_models::{
    filter_video_urls, GenerationRequest, Language, NewSummary, OutputMode, RecommendedVideo,
    StoredSummary, VideoRecord,
};
use vidsum_youtube::{ingest_urls, YoutubeError};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Default number of stored summaries returned by the list endpoint.
const DEFAULT_LIST_LIMIT: u32 = 5;
/// Upper bound on the list endpoint's `limit` parameter.
const MAX_LIST_LIMIT: u32 = 50;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for summary generation.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateSummaryRequest {
    /// Candidate video URLs. Lines that are not YouTube URLs are
    /// dropped rather than rejected.
    #[validate(length(min = 1, max = 10, message = "between 1 and 10 URLs required"))]
    pub urls: Vec<String>,
    /// Output language.
    pub language: Language,
    /// Output shape. Defaults to a full article.
    #[serde(default)]
    pub mode: OutputMode,
    /// Fetch related videos for the first source. Falls back to the
    /// server default when unset.
    pub with_recommendations: Option<bool>,
    /// Fetch the first source's channel uploads. Falls back to the
    /// server default when unset.
    pub with_channel_latest: Option<bool>,
    /// Persist the generated text. Falls back to the server default
    /// when unset.
    pub with_persistence: Option<bool>,
}

/// Response body for summary generation.
#[derive(Debug, Serialize)]
pub struct GenerateSummaryResponse {
    /// Generated article or summary text.
    pub text: String,
    pub language: Language,
    pub mode: OutputMode,
    /// Per-URL fetch outcomes, in request order.
    pub records: Vec<VideoRecord>,
    /// Related videos for the first fetched source, when requested.
    pub related_videos: Vec<RecommendedVideo>,
    /// Latest uploads from the first fetched source's channel, when
    /// requested.
    pub channel_videos: Vec<RecommendedVideo>,
    /// The stored row, when persistence was requested and succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<StoredSummary>,
    /// Non-fatal problems encountered along the way.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Query parameters for listing stored summaries.
#[derive(Debug, Deserialize)]
pub struct ListSummariesQuery {
    pub language: Option<Language>,
    pub limit: Option<u32>,
}

/// Response body for the list endpoint.
#[derive(Debug, Serialize)]
pub struct ListSummariesResponse {
    pub summaries: Vec<StoredSummary>,
    pub count: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/summaries/generate
///
/// Runs the full pipeline: ingest the URLs, assemble a prompt,
/// generate text, then fetch discovery extras and persist the result
/// as far as the request flags ask for. Discovery and persistence
/// failures degrade to warnings instead of failing the request.
pub async fn generate_summary(
    State(state): State<AppState>,
    Json(req): Json<GenerateSummaryRequest>,
) -> ApiResult<Json<GenerateSummaryResponse>> {
    req.validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let urls = filter_video_urls(&req.urls.join("\n"));
    if urls.is_empty() {
        return Err(ApiError::bad_request("no valid YouTube URLs provided"));
    }

    info!(
        url_count = urls.len(),
        language = %req.language,
        mode = req.mode.as_str(),
        "generating summary"
    );

    let outcome = ingest_urls(&state.youtube, &urls).await;
    metrics::record_ingestion(outcome.fetched_count() as u64, outcome.failed_count() as u64);

    if outcome.all_failed() {
        let detail = outcome
            .first_failure()
            .unwrap_or("all videos failed to load");
        return Err(ApiError::upstream(format!(
            "no videos could be loaded: {detail}"
        )));
    }

    let generation = GenerationRequest::from_records(&outcome.records, req.language, req.mode);
    let prompt = build_prompt(&generation);

    let start = Instant::now();
    let text = match state.gemini.generate(&prompt, req.language).await {
        Ok(text) => text,
        Err(e) => {
            metrics::record_generation_failure(req.language.as_str());
            return Err(e.into());
        }
    };
    metrics::record_summary_generated(
        req.language.as_str(),
        req.mode.as_str(),
        start.elapsed().as_secs_f64(),
    );
    info!(chars = text.chars().count(), "generation complete");

    let mut warnings = Vec::new();
    let seed = outcome.fetched().next();
    let max_results = state.youtube.default_max_results();

    let with_recommendations = req
        .with_recommendations
        .unwrap_or(state.config.default_with_recommendations);
    let related_videos = if with_recommendations {
        match seed {
            Some(source) => {
                match state
                    .youtube
                    .related_videos(&source.video_id, max_results)
                    .await
                {
                    Ok(videos) => videos,
                    Err(e) => {
                        warn!(video_id = %source.video_id, "related videos unavailable: {e}");
                        warnings.push(format!("related videos unavailable: {e}"));
                        Vec::new()
                    }
                }
            }
            None => Vec::new(),
        }
    } else {
        Vec::new()
    };

    let with_channel_latest = req
        .with_channel_latest
        .unwrap_or(state.config.default_with_channel_latest);
    let channel_videos = if with_channel_latest {
        match seed {
            Some(source) => {
                let result = match source.channel_id.as_deref() {
                    Some(channel_id) => {
                        state
                            .youtube
                            .latest_from_channel(channel_id, &source.video_id, max_results)
                            .await
                    }
                    None => Err(YoutubeError::NoChannelVideos),
                };
                match result {
                    Ok(videos) => videos,
                    Err(e) => {
                        warn!(video_id = %source.video_id, "channel videos unavailable: {e}");
                        warnings.push(format!("channel videos unavailable: {e}"));
                        Vec::new()
                    }
                }
            }
            None => Vec::new(),
        }
    } else {
        Vec::new()
    };

    let with_persistence = req
        .with_persistence
        .unwrap_or(state.config.default_with_persistence);
    let saved = if with_persistence {
        match seed {
            Some(source) => {
                let summary = NewSummary {
                    video_id: source.video_id.clone(),
                    title: source.title.clone(),
                    summary: text.clone(),
                    language: req.language,
                    source_urls: outcome.fetched().map(|s| s.url.clone()).collect(),
                    thumbnail_url: source.thumbnail_url.clone(),
                };
                match state.supabase.save(&summary).await {
                    Ok(stored) => {
                        metrics::record_summary_saved(req.language.as_str());
                        info!(id = stored.id, "summary saved");
                        Some(stored)
                    }
                    Err(e) => {
                        warn!("failed to save summary: {e}");
                        warnings.push(format!("failed to save summary: {e}"));
                        None
                    }
                }
            }
            None => None,
        }
    } else {
        None
    };

    Ok(Json(GenerateSummaryResponse {
        text,
        language: req.language,
        mode: req.mode,
        records: outcome.records,
        related_videos,
        channel_videos,
        saved,
        warnings,
    }))
}

/// GET /api/summaries
///
/// Lists stored summaries, newest first, optionally filtered by
/// language.
pub async fn list_summaries(
    State(state): State<AppState>,
    Query(query): Query<ListSummariesQuery>,
) -> ApiResult<Json<ListSummariesResponse>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    let summaries = match query.language {
        Some(language) => state.supabase.list_by_language(language, limit).await?,
        None => state.supabase.list_recent(limit).await?,
    };

    Ok(Json(ListSummariesResponse {
        count: summaries.len(),
        summaries,
    }))
}

/// DELETE /api/summaries/:id
pub async fn delete_summary(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let deleted = state.supabase.delete(id).await?;
    info!(id = deleted.id, video_id = %deleted.video_id, "summary deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_request_defaults_mode_and_flags() {
        let req: GenerateSummaryRequest = serde_json::from_str(
            r#"{"urls": ["https://youtu.be/dQw4w9WgXcQ"], "language": "ja"}"#,
        )
        .unwrap();

        assert_eq!(req.language, Language::Ja);
        assert_eq!(req.mode, OutputMode::Article);
        assert!(req.with_recommendations.is_none());
        assert!(req.with_channel_latest.is_none());
        assert!(req.with_persistence.is_none());
    }

    #[test]
    fn generate_request_rejects_unknown_language() {
        let result = serde_json::from_str::<GenerateSummaryRequest>(
            r#"{"urls": ["https://youtu.be/dQw4w9WgXcQ"], "language": "fr"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn generate_request_validates_url_count() {
        let empty: GenerateSummaryRequest =
            serde_json::from_str(r#"{"urls": [], "language": "en"}"#).unwrap();
        assert!(empty.validate().is_err());

        let urls: Vec<String> = (0..11)
            .map(|i| format!("https://youtu.be/video{i:05}"))
            .collect();
        let too_many = GenerateSummaryRequest {
            urls,
            language: Language::En,
            mode: OutputMode::Article,
            with_recommendations: None,
            with_channel_latest: None,
            with_persistence: None,
        };
        assert!(too_many.validate().is_err());
    }
}
