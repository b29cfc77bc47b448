//! Supabase persistence for generated summaries.
//!
//! Talks to the Supabase PostgREST endpoint for the `video_summaries` table:
//! insert on save, filtered and ordered selects for browsing, delete by row
//! id, and a lightweight connectivity probe for readiness checks.

pub mod client;
pub mod error;
pub mod metrics;
pub mod retry;


pub use client::{SupabaseClient, SupabaseConfig, SUMMARIES_TABLE};
pub use error::{SupabaseError, SupabaseResult};
pub use retry::{with_retry, RetryConfig};
