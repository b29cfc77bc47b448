//! Gemini `generateContent` client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use vidsum_models::Language;

use crate::error::{GeminiError, GeminiResult};
use crate::prompt::amend_prompt_for_chinese;
use crate::text::contains_cjk;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Configuration for the Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub max_output_tokens: u32,
}

impl GeminiConfig {
    /// Loads configuration from the environment. `GEMINI_API_KEY` is
    /// required, everything else has defaults.
    pub fn from_env() -> GeminiResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GeminiError::MissingApiKey)?;

        let base_url = std::env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_secs = std::env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(60);

        let max_output_tokens = std::env::var("GEMINI_MAX_OUTPUT_TOKENS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(8192);

        Ok(Self {
            api_key,
            base_url,
            model,
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(5),
            max_output_tokens,
        })
    }
}

/// Sampling parameters sent with every generation request.
///
/// Chinese output is sampled hotter than the other languages: at the default
/// temperature the model drifts into English for mixed-language transcripts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub candidate_count: u32,
}

impl SamplingConfig {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Zh => Self { temperature: 0.9, top_p: 0.95, top_k: 40, candidate_count: 1 },
            Language::Ja | Language::En => {
                Self { temperature: 0.7, top_p: 0.8, top_k: 40, candidate_count: 1 }
            }
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_p: f64,
    top_k: u32,
    candidate_count: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

// ============================================================================
// Client
// ============================================================================

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> GeminiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("vidsum-gemini/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> GeminiResult<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    /// Generates text for an assembled prompt.
    ///
    /// Chinese output is validated to contain CJK characters. When the first
    /// attempt comes back without any, the request is retried exactly once
    /// with a stronger language directive appended; the retried text is
    /// returned as-is even if it still fails validation.
    pub async fn generate(&self, prompt: &str, language: Language) -> GeminiResult<String> {
        let sampling = SamplingConfig::for_language(language);
        let text = self.call_generate(prompt, &sampling).await?;

        if language == Language::Zh && !contains_cjk(&text) {
            warn!("Chinese generation contains no CJK characters, retrying once");
            let amended = amend_prompt_for_chinese(prompt);
            let retried = self.call_generate(&amended, &sampling).await?;
            if !contains_cjk(&retried) {
                warn!("Chinese retry still contains no CJK characters, keeping the result");
            }
            return Ok(retried);
        }

        Ok(text)
    }

    async fn call_generate(&self, prompt: &str, sampling: &SamplingConfig) -> GeminiResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, self.config.api_key
        );

        let request = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: prompt.to_string() }] }],
            generation_config: GenerationConfig {
                temperature: sampling.temperature,
                top_p: sampling.top_p,
                top_k: sampling.top_k,
                candidate_count: sampling.candidate_count,
                max_output_tokens: self.config.max_output_tokens,
            },
        };

        debug!(
            model = %self.config.model,
            prompt_chars = prompt.chars().count(),
            "calling Gemini generateContent"
        );

        let response = self.http.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Gemini API error: {error_text}");
            return Err(GeminiError::generation_failure(format!(
                "Gemini API returned {status}: {error_text}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::parse(format!("failed to decode response: {e}")))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| GeminiError::generation_failure("no content in Gemini response"))
    }
}
