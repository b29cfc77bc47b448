//! YouTube client crate.
//!
//! This crate provides:
//! - Video metadata lookup via the Data API v3
//! - Related-video search and channel-latest listing
//! - Caption transcript retrieval via the InnerTube player API
//! - The multi-video ingestion pipeline with per-item failure isolation

pub mod client;
pub mod error;
pub mod pipeline;
pub mod retry;
pub mod transcript;

pub use client::{VideoDetails, YoutubeClient, YoutubeConfig};
pub use error::{YoutubeError, YoutubeResult};
pub use pipeline::{ingest_urls, IngestOutcome};
pub use retry::RetryConfig;
pub use transcript::TRANSCRIPT_LANGUAGE_PRIORITY;
