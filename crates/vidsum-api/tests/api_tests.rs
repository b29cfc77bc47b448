//! Router-level tests with all three upstreams mocked.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vidsum_api::{create_router, ApiConfig, AppState};
use vidsum_gemini::{GeminiClient, GeminiConfig};
use vidsum_supabase::{SupabaseClient, SupabaseConfig};
use vidsum_youtube::{RetryConfig, YoutubeClient, YoutubeConfig};

// ============================================================================
// Harness
// ============================================================================

struct TestBackends {
    youtube: MockServer,
    gemini: MockServer,
    supabase: MockServer,
}

impl TestBackends {
    async fn start() -> Self {
        Self {
            youtube: MockServer::start().await,
            gemini: MockServer::start().await,
            supabase: MockServer::start().await,
        }
    }
}

fn build_state(backends: &TestBackends, config: ApiConfig) -> AppState {
    let youtube = YoutubeClient::new(YoutubeConfig {
        api_key: "test-key".to_string(),
        api_base_url: backends.youtube.uri(),
        watch_base_url: backends.youtube.uri(),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
        max_results: 5,
        retry: RetryConfig {
            max_retries: 0,
            base_delay_ms: 1,
            max_delay_ms: 2,
        },
    })
    .unwrap();

    let gemini = GeminiClient::new(GeminiConfig {
        api_key: "gemini-test-key".to_string(),
        base_url: backends.gemini.uri(),
        model: "gemini-2.5-flash".to_string(),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
        max_output_tokens: 8192,
    })
    .unwrap();

    let supabase = SupabaseClient::new(SupabaseConfig {
        url: backends.supabase.uri(),
        key: "supabase-test-key".to_string(),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
        retry: vidsum_supabase::RetryConfig {
            max_retries: 0,
            base_delay_ms: 1,
            max_delay_ms: 2,
        },
    })
    .unwrap();

    AppState {
        config,
        youtube: Arc::new(youtube),
        gemini: Arc::new(gemini),
        supabase: Arc::new(supabase),
    }
}

fn app(backends: &TestBackends) -> Router {
    create_router(build_state(backends, ApiConfig::default()), None)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Mount the full fetch chain for one video: snippet lookup, watch page,
/// InnerTube player, and caption XML.
async fn mount_video(server: &MockServer, video_id: &str, title: &str) {
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", video_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{
                "id": video_id,
                "snippet": {
                    "title": title,
                    "description": format!("{title} description"),
                    "channelId": "UCtest",
                    "thumbnails": { "default": { "url": "https://i.ytimg.com/x/default.jpg" } }
                }
            }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", video_id))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<html>"INNERTUBE_API_KEY":"inner-test-key"</html>"#),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/youtubei/v1/player"))
        .and(body_partial_json(serde_json::json!({ "videoId": video_id })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "captions": {
                "playerCaptionsTracklistRenderer": {
                    "captionTracks": [{
                        "baseUrl": format!("{}/timedtext?vid={video_id}", server.uri()),
                        "languageCode": "en"
                    }]
                }
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/timedtext"))
        .and(query_param("vid", video_id))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<transcript><text start="0" dur="1">Words for {title}</text></transcript>"#
        )))
        .mount(server)
        .await;
}

async fn mount_channel_search(server: &MockServer, channel_id: &str) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("channelId", channel_id))
        .and(query_param("order", "date"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                {
                    "id": { "videoId": "ddddddddddd" },
                    "snippet": { "title": "Newer upload", "thumbnails": {} }
                },
                {
                    "id": { "videoId": "aaaaaaaaaaa" },
                    "snippet": { "title": "The seed itself", "thumbnails": {} }
                }
            ]
        })))
        .mount(server)
        .await;
}

async fn mount_gemini(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })))
        .mount(server)
        .await;
}

async fn mount_save(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/rest/v1/video_summaries"))
        .and(body_partial_json(serde_json::json!({
            "video_id": "aaaaaaaaaaa",
            "language": "ja"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([{
            "id": 42,
            "video_id": "aaaaaaaaaaa",
            "title": "First",
            "summary": "記事のテキストです。",
            "language": "ja",
            "timestamp": "2026-08-20T10:30:00+00:00",
            "source_urls": "https://youtu.be/aaaaaaaaaaa,https://youtu.be/bbbbbbbbbbb",
            "thumbnail_url": "https://i.ytimg.com/x/default.jpg"
        }])))
        .mount(server)
        .await;
}

fn stored_row(id: i64, language: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "video_id": "aaaaaaaaaaa",
        "title": "Stored",
        "summary": "text",
        "language": language,
        "timestamp": "2026-08-20T10:30:00+00:00",
        "source_urls": "https://youtu.be/aaaaaaaaaaa",
        "thumbnail_url": null
    })
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let backends = TestBackends::start().await;

    let response = app(&backends).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn ready_reports_ready_when_supabase_responds() {
    let backends = TestBackends::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/video_summaries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&backends.supabase)
        .await;

    let response = app(&backends).oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["supabase"]["status"], "ok");
}

#[tokio::test]
async fn ready_degrades_when_supabase_is_down() {
    let backends = TestBackends::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/video_summaries"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&backends.supabase)
        .await;

    let response = app(&backends).oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["supabase"]["status"], "error");
}

// ============================================================================
// Summary Generation
// ============================================================================

#[tokio::test]
async fn generate_runs_full_pipeline() {
    let backends = TestBackends::start().await;
    mount_video(&backends.youtube, "aaaaaaaaaaa", "First").await;
    mount_video(&backends.youtube, "bbbbbbbbbbb", "Second").await;
    mount_channel_search(&backends.youtube, "UCtest").await;
    mount_gemini(&backends.gemini, "記事のテキストです。").await;
    mount_save(&backends.supabase).await;

    let response = app(&backends)
        .oneshot(post_json(
            "/api/summaries/generate",
            serde_json::json!({
                "urls": ["https://youtu.be/aaaaaaaaaaa", "https://youtu.be/bbbbbbbbbbb"],
                "language": "ja"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["text"], "記事のテキストです。");
    assert_eq!(body["language"], "ja");
    assert_eq!(body["mode"], "article");

    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["status"], "fetched");
    assert_eq!(records[0]["video_id"], "aaaaaaaaaaa");
    assert_eq!(records[1]["title"], "Second");

    // Channel uploads come back with the seed video filtered out.
    let channel = body["channel_videos"].as_array().unwrap();
    assert_eq!(channel.len(), 1);
    assert_eq!(channel[0]["id"], "ddddddddddd");

    // Recommendations are off by default.
    assert_eq!(body["related_videos"].as_array().unwrap().len(), 0);

    // Persistence is on by default; the stored row is echoed back.
    assert_eq!(body["saved"]["id"], 42);
    assert!(body.get("warnings").is_none());
}

#[tokio::test]
async fn generate_keeps_failed_records_alongside_fetched() {
    let backends = TestBackends::start().await;
    mount_video(&backends.youtube, "aaaaaaaaaaa", "Only").await;
    mount_channel_search(&backends.youtube, "UCtest").await;
    mount_gemini(&backends.gemini, "The generated article.").await;
    // The second video does not exist upstream.
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "ccccccccccc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": [] })))
        .mount(&backends.youtube)
        .await;

    let response = app(&backends)
        .oneshot(post_json(
            "/api/summaries/generate",
            serde_json::json!({
                "urls": ["https://youtu.be/aaaaaaaaaaa", "https://youtu.be/ccccccccccc"],
                "language": "en",
                "with_persistence": false
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    let records = body["records"].as_array().unwrap();
    assert_eq!(records[0]["status"], "fetched");
    assert_eq!(records[1]["status"], "failed");
    assert!(records[1]["error"].as_str().unwrap().contains("not found"));
    assert!(body.get("saved").is_none());
}

#[tokio::test]
async fn generate_fails_with_bad_gateway_when_no_videos_load() {
    let backends = TestBackends::start().await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": [] })))
        .mount(&backends.youtube)
        .await;

    let response = app(&backends)
        .oneshot(post_json(
            "/api/summaries/generate",
            serde_json::json!({ "urls": ["https://youtu.be/aaaaaaaaaaa"], "language": "en" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("no videos could be loaded"));
}

#[tokio::test]
async fn generate_survives_persistence_failure() {
    let backends = TestBackends::start().await;
    mount_video(&backends.youtube, "aaaaaaaaaaa", "Solo").await;
    mount_channel_search(&backends.youtube, "UCtest").await;
    mount_gemini(&backends.gemini, "The generated article.").await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/video_summaries"))
        .respond_with(ResponseTemplate::new(500).set_body_string("insert failed"))
        .mount(&backends.supabase)
        .await;

    let response = app(&backends)
        .oneshot(post_json(
            "/api/summaries/generate",
            serde_json::json!({ "urls": ["https://youtu.be/aaaaaaaaaaa"], "language": "en" }),
        ))
        .await
        .unwrap();

    // Generation succeeded; only the save degraded to a warning.
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["text"], "The generated article.");
    assert!(body.get("saved").is_none());

    let warnings = body["warnings"].as_array().unwrap();
    assert!(warnings[0].as_str().unwrap().contains("failed to save"));
}

#[tokio::test]
async fn generate_rejects_empty_url_list() {
    let backends = TestBackends::start().await;

    let response = app(&backends)
        .oneshot(post_json(
            "/api/summaries/generate",
            serde_json::json!({ "urls": [], "language": "ja" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn generate_rejects_non_youtube_urls() {
    let backends = TestBackends::start().await;

    let response = app(&backends)
        .oneshot(post_json(
            "/api/summaries/generate",
            serde_json::json!({
                "urls": ["https://example.com/watch?v=aaaaaaaaaaa"],
                "language": "ja"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("no valid YouTube URLs"));
}

#[tokio::test]
async fn generate_rejects_unknown_language() {
    let backends = TestBackends::start().await;

    let response = app(&backends)
        .oneshot(post_json(
            "/api/summaries/generate",
            serde_json::json!({ "urls": ["https://youtu.be/aaaaaaaaaaa"], "language": "fr" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ============================================================================
// Stored Summaries
// ============================================================================

#[tokio::test]
async fn list_summaries_filters_by_language() {
    let backends = TestBackends::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/video_summaries"))
        .and(query_param("language", "eq.zh"))
        .and(query_param("order", "timestamp.desc"))
        .and(query_param("limit", "5"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([stored_row(7, "zh")])),
        )
        .mount(&backends.supabase)
        .await;

    let response = app(&backends)
        .oneshot(get("/api/summaries?language=zh"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["summaries"][0]["language"], "zh");
    assert_eq!(body["summaries"][0]["id"], 7);
}

#[tokio::test]
async fn list_summaries_clamps_limit() {
    let backends = TestBackends::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/video_summaries"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&backends.supabase)
        .await;

    let response = app(&backends)
        .oneshot(get("/api/summaries?limit=500"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn delete_summary_returns_no_content() {
    let backends = TestBackends::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/video_summaries"))
        .and(query_param("id", "eq.42"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([stored_row(42, "ja")])),
        )
        .mount(&backends.supabase)
        .await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/summaries/42")
        .body(Body::empty())
        .unwrap();
    let response = app(&backends).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn delete_missing_summary_returns_not_found() {
    let backends = TestBackends::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/video_summaries"))
        .and(query_param("id", "eq.999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&backends.supabase)
        .await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/summaries/999")
        .body(Body::empty())
        .unwrap();
    let response = app(&backends).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("summary not found"));
}

// ============================================================================
// Video Discovery
// ============================================================================

#[tokio::test]
async fn related_videos_returns_results() {
    let backends = TestBackends::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("relatedToVideoId", "aaaaaaaaaaa"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                { "id": { "videoId": "eeeeeeeeeee" }, "snippet": { "title": "Rec one", "thumbnails": {} } },
                { "id": { "videoId": "fffffffffff" }, "snippet": { "title": "Rec two", "thumbnails": {} } }
            ]
        })))
        .mount(&backends.youtube)
        .await;

    let response = app(&backends)
        .oneshot(get("/api/videos/related?url=https://youtu.be/aaaaaaaaaaa"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["videos"][0]["id"], "eeeeeeeeeee");
}

#[tokio::test]
async fn related_videos_empty_returns_not_found_code() {
    let backends = TestBackends::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": [] })))
        .mount(&backends.youtube)
        .await;

    let response = app(&backends)
        .oneshot(get("/api/videos/related?url=https://youtu.be/aaaaaaaaaaa"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["code"], "no_recommendations");
}

#[tokio::test]
async fn related_videos_honors_max_results_override() {
    let backends = TestBackends::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("maxResults", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                { "id": { "videoId": "eeeeeeeeeee" }, "snippet": { "title": "Rec", "thumbnails": {} } }
            ]
        })))
        .expect(1)
        .mount(&backends.youtube)
        .await;

    let response = app(&backends)
        .oneshot(get(
            "/api/videos/related?url=https://youtu.be/aaaaaaaaaaa&max_results=3",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn channel_latest_endpoint_excludes_seed() {
    let backends = TestBackends::start().await;
    mount_video(&backends.youtube, "aaaaaaaaaaa", "Seed").await;
    mount_channel_search(&backends.youtube, "UCtest").await;

    let response = app(&backends)
        .oneshot(get("/api/videos/channel-latest?url=https://youtu.be/aaaaaaaaaaa"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["videos"][0]["id"], "ddddddddddd");
}

#[tokio::test]
async fn related_videos_rejects_invalid_seed_url() {
    let backends = TestBackends::start().await;

    let response = app(&backends)
        .oneshot(get("/api/videos/related?url=https://youtu.be/short"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Middleware
// ============================================================================

#[tokio::test]
async fn responses_carry_security_headers_and_request_id() {
    let backends = TestBackends::start().await;

    let response = app(&backends).oneshot(get("/health")).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    assert!(headers.contains_key("X-Request-ID"));
}

#[tokio::test]
async fn request_id_is_propagated_from_client() {
    let backends = TestBackends::start().await;

    let request = Request::builder()
        .uri("/health")
        .header("X-Request-ID", "test-req-123")
        .body(Body::empty())
        .unwrap();
    let response = app(&backends).oneshot(request).await.unwrap();

    assert_eq!(response.headers().get("X-Request-ID").unwrap(), "test-req-123");
}

#[tokio::test]
async fn rate_limit_returns_429_after_burst() {
    let backends = TestBackends::start().await;
    let config = ApiConfig {
        rate_limit_rps: 1,
        rate_limit_burst: 1,
        ..ApiConfig::default()
    };
    let app = create_router(build_state(&backends, config), None);

    let request = || {
        Request::builder()
            .method("POST")
            .uri("/api/summaries/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .header("X-Forwarded-For", "203.0.113.9")
            .body(Body::from(r#"{"urls": [], "language": "ja"}"#))
            .unwrap()
    };

    let first = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(first.status(), StatusCode::BAD_REQUEST);

    let second = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(second.headers().get("Retry-After").unwrap(), "1");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let backends = TestBackends::start().await;
    let config = ApiConfig {
        max_body_size: 64,
        ..ApiConfig::default()
    };
    let app = create_router(build_state(&backends, config), None);

    let big_url = format!("https://youtu.be/{}", "a".repeat(200));
    let response = app
        .oneshot(post_json(
            "/api/summaries/generate",
            serde_json::json!({ "urls": [big_url], "language": "ja" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
