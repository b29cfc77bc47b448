//! Error types for Gemini generation.

use thiserror::Error;

pub type GeminiResult<T> = Result<T, GeminiError>;

/// Errors from prompt generation and the Gemini API.
///
/// Generation failures are terminal for the request that triggered them:
/// there is no automatic retry beyond the single Chinese-output validation
/// retry performed by the client itself.
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("GEMINI_API_KEY must be set")]
    MissingApiKey,

    #[error("generation failed: {0}")]
    GenerationFailure(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid Gemini response: {0}")]
    Parse(String),
}

impl GeminiError {
    pub fn generation_failure(message: impl Into<String>) -> Self {
        Self::GenerationFailure(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
