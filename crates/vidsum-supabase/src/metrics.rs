//! Metrics for Supabase REST operations.

use std::time::Duration;

use metrics::{counter, histogram};

/// Total requests by operation and final status.
pub const REQUESTS_TOTAL: &str = "supabase_requests_total";

/// Retry attempts by operation.
pub const RETRIES_TOTAL: &str = "supabase_retries_total";

/// Request latency in seconds by operation.
pub const LATENCY_SECONDS: &str = "supabase_latency_seconds";

/// Record a completed request, including its retries and backoff time.
pub fn record_request(operation: &str, status: u16, latency: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(LATENCY_SECONDS, "operation" => operation.to_string())
        .record(latency.as_secs_f64());
}

/// Record a retry attempt.
pub fn record_retry(operation: &str) {
    counter!(RETRIES_TOTAL, "operation" => operation.to_string()).increment(1);
}
