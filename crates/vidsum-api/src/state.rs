//! Shared application state.

use std::sync::Arc;

use anyhow::Context;
use vidsum_gemini::GeminiClient;
use vidsum_supabase::SupabaseClient;
use vidsum_youtube::YoutubeClient;

use crate::config::ApiConfig;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub youtube: Arc<YoutubeClient>,
    pub gemini: Arc<GeminiClient>,
    pub supabase: Arc<SupabaseClient>,
}

impl AppState {
    /// Build application state with clients configured from the
    /// environment.
    pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let youtube = YoutubeClient::from_env().context("failed to initialize YouTube client")?;
        let gemini = GeminiClient::from_env().context("failed to initialize Gemini client")?;
        let supabase =
            SupabaseClient::from_env().context("failed to initialize Supabase client")?;

        Ok(Self {
            config,
            youtube: Arc::new(youtube),
            gemini: Arc::new(gemini),
            supabase: Arc::new(supabase),
        })
    }
}
