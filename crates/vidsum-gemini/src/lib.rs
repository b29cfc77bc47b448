//! Prompt assembly and text generation through the Gemini API.
//!
//! The crate is split along the generation pipeline: [`text`] prepares
//! transcripts (truncation, Chinese normalization), [`prompt`] assembles the
//! language- and mode-specific prompt, and [`client`] sends it to the Gemini
//! `generateContent` endpoint with per-language sampling parameters.

pub mod client;
pub mod error;
pub mod prompt;
pub mod text;

pub use client::{GeminiClient, GeminiConfig, SamplingConfig};
pub use error::{GeminiError, GeminiResult};
pub use prompt::{amend_prompt_for_chinese, build_prompt, template_for, PromptTemplate};
pub use text::{contains_cjk, normalize_chinese, truncate_transcript, TRANSCRIPT_CHAR_BUDGET};
