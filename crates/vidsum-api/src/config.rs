//! API server configuration.

use std::time::Duration;

// ============================================================================
// Configuration
// ============================================================================

/// API server configuration, loaded from the environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Allowed CORS origins. `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// Per-client requests per second.
    pub rate_limit_rps: u32,
    /// Per-client burst allowance.
    pub rate_limit_burst: u32,
    /// Request timeout.
    pub request_timeout: Duration,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
    /// Deployment environment name.
    pub environment: String,
    /// Whether generation requests fetch related videos when the
    /// request leaves the flag unset.
    pub default_with_recommendations: bool,
    /// Whether generation requests fetch the channel's latest uploads
    /// when the request leaves the flag unset.
    pub default_with_channel_latest: bool,
    /// Whether generated summaries are saved when the request leaves
    /// the flag unset.
    pub default_with_persistence: bool,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            rate_limit_burst: std::env::var("RATE_LIMIT_BURST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(120),
            ),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024 * 1024),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            default_with_recommendations: env_flag("DEFAULT_WITH_RECOMMENDATIONS", false),
            default_with_channel_latest: env_flag("DEFAULT_WITH_CHANNEL_LATEST", true),
            default_with_persistence: env_flag("DEFAULT_WITH_PERSISTENCE", true),
        }
    }

    /// Whether this is a production deployment.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 10,
            rate_limit_burst: 20,
            request_timeout: Duration::from_secs(120),
            max_body_size: 1024 * 1024,
            environment: "development".to_string(),
            default_with_recommendations: false,
            default_with_channel_latest: true,
            default_with_persistence: true,
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

// ============================================================================
// Tests
// ============================================================================
