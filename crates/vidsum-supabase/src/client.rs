//! Supabase PostgREST client for the summaries table.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{info_span, warn, Instrument};
use vidsum_models::{Language, NewSummary, StoredSummary};

use crate::error::{SupabaseError, SupabaseResult};
use crate::metrics::record_request;
use crate::retry::{with_retry, RetryConfig};

/// Table holding generated summaries.
pub const SUMMARIES_TABLE: &str = "video_summaries";

// ============================================================================
// Configuration
// ============================================================================

/// Supabase client configuration.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project base URL, e.g. `https://xyzcompany.supabase.co`.
    pub url: String,
    /// Service role or anon API key.
    pub key: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Retry configuration.
    pub retry: RetryConfig,
}

impl SupabaseConfig {
    /// Create config from environment variables. `SUPABASE_URL` and
    /// `SUPABASE_KEY` are required.
    pub fn from_env() -> SupabaseResult<Self> {
        let url = std::env::var("SUPABASE_URL")
            .ok()
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| SupabaseError::config("SUPABASE_URL must be set"))?;

        let key = std::env::var("SUPABASE_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| SupabaseError::config("SUPABASE_KEY must be set"))?;

        let timeout_secs: u64 = std::env::var("SUPABASE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let connect_timeout_secs: u64 = std::env::var("SUPABASE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            url,
            key,
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            retry: RetryConfig::from_env(),
        })
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    video_id: &'a str,
    title: &'a str,
    summary: &'a str,
    language: Language,
    timestamp: DateTime<Utc>,
    source_urls: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail_url: Option<&'a str>,
}

// ============================================================================
// Client
// ============================================================================

/// Supabase REST client.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    config: SupabaseConfig,
    rest_url: String,
}

impl SupabaseClient {
    /// Create a new client. The API key is attached to every request as both
    /// `apikey` and bearer authorization, the way PostgREST expects.
    pub fn new(config: SupabaseConfig) -> SupabaseResult<Self> {
        let mut headers = HeaderMap::new();

        let mut api_key = HeaderValue::from_str(&config.key)
            .map_err(|_| SupabaseError::config("SUPABASE_KEY is not a valid header value"))?;
        api_key.set_sensitive(true);
        headers.insert(HeaderName::from_static("apikey"), api_key);

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.key))
            .map_err(|_| SupabaseError::config("SUPABASE_KEY is not a valid header value"))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("vidsum-supabase/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        let rest_url = format!("{}/rest/v1", config.url);

        Ok(Self {
            http,
            config,
            rest_url,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> SupabaseResult<Self> {
        Self::new(SupabaseConfig::from_env()?)
    }

    fn table_url(&self) -> String {
        format!("{}/{}", self.rest_url, SUMMARIES_TABLE)
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Insert a summary and return the stored row.
    ///
    /// The persistence timestamp is set here, once, so retries of the same
    /// insert carry the same value.
    pub async fn save(&self, summary: &NewSummary) -> SupabaseResult<StoredSummary> {
        let url = self.table_url();
        let row = InsertRow {
            video_id: &summary.video_id,
            title: &summary.title,
            summary: &summary.summary,
            language: summary.language,
            timestamp: Utc::now(),
            source_urls: summary.joined_source_urls(),
            thumbnail_url: summary.thumbnail_url.as_deref(),
        };

        self.execute_request("save_summary", async {
            with_retry(&self.config.retry, "save_summary", || async {
                let response = self
                    .http
                    .post(&url)
                    .header("Prefer", "return=representation")
                    .json(&row)
                    .send()
                    .await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(Self::handle_error_response(status, &url, response).await);
                }

                let rows: Vec<StoredSummary> = response
                    .json()
                    .await
                    .map_err(|e| SupabaseError::parse(format!("insert response: {e}")))?;
                rows.into_iter()
                    .next()
                    .ok_or_else(|| SupabaseError::parse("insert returned no rows"))
            })
            .await
        })
        .await
    }

    /// List summaries for one language, newest first.
    pub async fn list_by_language(
        &self,
        language: Language,
        limit: u32,
    ) -> SupabaseResult<Vec<StoredSummary>> {
        let url = self.table_url();
        let language_filter = format!("eq.{}", language.as_str());
        let limit_value = limit.to_string();

        self.execute_request("list_by_language", async {
            with_retry(&self.config.retry, "list_by_language", || async {
                let response = self
                    .http
                    .get(&url)
                    .query(&[
                        ("select", "*"),
                        ("language", language_filter.as_str()),
                        ("order", "timestamp.desc"),
                        ("limit", limit_value.as_str()),
                    ])
                    .send()
                    .await?;
                Self::read_rows(&url, response).await
            })
            .await
        })
        .await
    }

    /// List the most recent summaries across all languages, newest first.
    pub async fn list_recent(&self, limit: u32) -> SupabaseResult<Vec<StoredSummary>> {
        let url = self.table_url();
        let limit_value = limit.to_string();

        self.execute_request("list_recent", async {
            with_retry(&self.config.retry, "list_recent", || async {
                let response = self
                    .http
                    .get(&url)
                    .query(&[
                        ("select", "*"),
                        ("order", "timestamp.desc"),
                        ("limit", limit_value.as_str()),
                    ])
                    .send()
                    .await?;
                Self::read_rows(&url, response).await
            })
            .await
        })
        .await
    }

    /// Delete a summary by row id, returning the deleted row.
    ///
    /// PostgREST reports a delete that matched nothing as a success with an
    /// empty representation, so the emptiness of the returned rows is what
    /// distinguishes a missing id.
    pub async fn delete(&self, id: i64) -> SupabaseResult<StoredSummary> {
        let url = self.table_url();
        let id_filter = format!("eq.{id}");

        self.execute_request("delete_summary", async {
            with_retry(&self.config.retry, "delete_summary", || async {
                let response = self
                    .http
                    .delete(&url)
                    .header("Prefer", "return=representation")
                    .query(&[("id", id_filter.as_str())])
                    .send()
                    .await?;
                let rows = Self::read_rows(&url, response).await?;
                rows.into_iter()
                    .next()
                    .ok_or_else(|| SupabaseError::not_found(id.to_string()))
            })
            .await
        })
        .await
    }

    /// Cheap connectivity probe for readiness checks. Never errors.
    pub async fn verify_connection(&self) -> bool {
        let url = self.table_url();
        let result = self
            .http
            .get(&url)
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(status = %response.status(), "Supabase connectivity check failed");
                false
            }
            Err(e) => {
                warn!("Supabase connectivity check failed: {e}");
                false
            }
        }
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Execute a request with tracing and metrics.
    async fn execute_request<T, F>(&self, operation: &str, fut: F) -> SupabaseResult<T>
    where
        F: std::future::Future<Output = SupabaseResult<T>>,
    {
        let span = info_span!(
            "supabase_request",
            operation = %operation,
            table = SUMMARIES_TABLE
        );

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency = start.elapsed();

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency);

        result
    }

    async fn read_rows(
        url: &str,
        response: reqwest::Response,
    ) -> SupabaseResult<Vec<StoredSummary>> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, url, response).await);
        }
        response
            .json()
            .await
            .map_err(|e| SupabaseError::parse(format!("row decode: {e}")))
    }

    async fn handle_error_response(
        status: StatusCode,
        url: &str,
        response: reqwest::Response,
    ) -> SupabaseError {
        let retry_after_ms = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok())
            .map(|secs| secs.saturating_mul(1000));
        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return SupabaseError::RateLimited(retry_after_ms.unwrap_or(1000));
        }
        SupabaseError::from_http_status(status.as_u16(), format!("{url} failed: {body}"))
    }
}
