//! Output language selection.
//!
//! The service generates text in exactly three languages. The enum is
//! closed on purpose: an unknown code fails at the parse boundary instead
//! of silently falling back to a default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Supported output languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Japanese
    Ja,
    /// English
    En,
    /// Chinese
    Zh,
}

/// Error returned when parsing a language code outside `ja`/`en`/`zh`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language code: {0}")]
pub struct UnsupportedLanguage(pub String);

impl Language {
    /// All supported languages, in UI order.
    pub const ALL: [Language; 3] = [Language::Ja, Language::En, Language::Zh];

    /// The lowercase ISO 639-1 code, as stored and sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Ja => "ja",
            Language::En => "en",
            Language::Zh => "zh",
        }
    }

    /// Human-readable name in English.
    pub fn english_name(&self) -> &'static str {
        match self {
            Language::Ja => "Japanese",
            Language::En => "English",
            Language::Zh => "Chinese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ja" => Ok(Language::Ja),
            "en" => Ok(Language::En),
            "zh" => Ok(Language::Zh),
            other => Err(UnsupportedLanguage(other.to_string())),
        }
    }
}
