//! Shared data models for the VidSum backend.
//!
//! This crate provides Serde-serializable types for:
//! - Output language and mode selection
//! - Per-video ingestion records (success or failure)
//! - Generation requests handed to the prompt assembler
//! - Stored summary rows
//! - YouTube URL filtering and video-id extraction

pub mod generation;
pub mod language;
pub mod summary;
pub mod utils;
pub mod video;

// Re-export common types
pub use generation::{GenerationRequest, OutputMode};
pub use language::{Language, UnsupportedLanguage};
pub use summary::{NewSummary, StoredSummary};
pub use utils::{extract_video_id, filter_video_urls, is_video_url, VideoUrlError, VideoUrlResult};
pub use video::{RecommendedVideo, VideoRecord, VideoRef, VideoSource};
