//! HTTP API server for VidSum.
//!
//! Exposes summary generation, stored-summary browsing, and video
//! discovery endpoints on top of the YouTube, Gemini, and Supabase
//! clients. Includes rate limiting, security headers, request
//! tracing, and Prometheus metrics.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
