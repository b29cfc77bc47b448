//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "vidsum_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "vidsum_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "vidsum_http_requests_in_flight";

    // Ingestion metrics
    pub const VIDEOS_INGESTED_TOTAL: &str = "vidsum_videos_ingested_total";
    pub const VIDEO_INGEST_FAILURES_TOTAL: &str = "vidsum_video_ingest_failures_total";

    // Generation metrics
    pub const SUMMARIES_GENERATED_TOTAL: &str = "vidsum_summaries_generated_total";
    pub const GENERATION_FAILURES_TOTAL: &str = "vidsum_generation_failures_total";
    pub const GENERATION_DURATION_SECONDS: &str = "vidsum_generation_duration_seconds";

    // Persistence metrics
    pub const SUMMARIES_SAVED_TOTAL: &str = "vidsum_summaries_saved_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "vidsum_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record the outcome of a video ingestion pass.
pub fn record_ingestion(fetched: u64, failed: u64) {
    if fetched > 0 {
        counter!(names::VIDEOS_INGESTED_TOTAL).increment(fetched);
    }
    if failed > 0 {
        counter!(names::VIDEO_INGEST_FAILURES_TOTAL).increment(failed);
    }
}

/// Record a generated summary.
pub fn record_summary_generated(language: &str, mode: &str, duration_secs: f64) {
    let labels = [
        ("language", language.to_string()),
        ("mode", mode.to_string()),
    ];
    counter!(names::SUMMARIES_GENERATED_TOTAL, &labels).increment(1);
    histogram!(names::GENERATION_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a failed generation attempt.
pub fn record_generation_failure(language: &str) {
    let labels = [("language", language.to_string())];
    counter!(names::GENERATION_FAILURES_TOTAL, &labels).increment(1);
}

/// Record a summary persisted to Supabase.
pub fn record_summary_saved(language: &str) {
    let labels = [("language", language.to_string())];
    counter!(names::SUMMARIES_SAVED_TOTAL, &labels).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Sanitize path for metrics labels (remove IDs, etc.).
fn sanitize_path(path: &str) -> String {
    // Replace numeric summary IDs with a placeholder
    regex_lite::Regex::new(r"/[0-9]+(/|$)")
        .unwrap()
        .replace_all(path, "/:id$1")
        .to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    // Increment in-flight counter
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    // Decrement in-flight counter
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
