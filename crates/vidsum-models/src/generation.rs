//! Generation request types: what one user action hands to the prompt
//! assembler.

use crate::language::Language;
use crate::video::{VideoRecord, VideoSource};
use serde::{Deserialize, Serialize};

/// Requested output shape: a full article or a condensed summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Article,
    Summary,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Article => "article",
            OutputMode::Summary => "summary",
        }
    }
}

/// Inputs for one generation: fetched sources only, plus language and mode.
///
/// Built via [`GenerationRequest::from_records`], which drops failure
/// records, so the assembler never has to re-check for errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub sources: Vec<VideoSource>,
    pub language: Language,
    pub mode: OutputMode,
}

impl GenerationRequest {
    pub fn new(sources: Vec<VideoSource>, language: Language, mode: OutputMode) -> Self {
        Self {
            sources,
            language,
            mode,
        }
    }

    /// Keep the fetched records, in order; failures are left behind for the
    /// caller to report separately.
    pub fn from_records(records: &[VideoRecord], language: Language, mode: OutputMode) -> Self {
        let sources = records
            .iter()
            .filter_map(VideoRecord::as_source)
            .cloned()
            .collect();
        Self::new(sources, language, mode)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::VideoRecord;

    fn fetched(id: &str) -> VideoRecord {
        VideoRecord::Fetched(VideoSource {
            url: format!("https://youtu.be/{id}"),
            video_id: id.to_string(),
            title: format!("title {id}"),
            description: String::new(),
            transcript: "words".to_string(),
            channel_id: None,
            thumbnail_url: None,
        })
    }

    #[test]
    fn test_from_records_keeps_only_fetched_in_order() {
        let records = vec![
            fetched("aaaaaaaaaaa"),
            VideoRecord::failed("https://youtu.be/broken", "Video not found"),
            fetched("bbbbbbbbbbb"),
        ];
        let request =
            GenerationRequest::from_records(&records, Language::En, OutputMode::Article);

        assert_eq!(request.sources.len(), 2);
        assert_eq!(request.sources[0].video_id, "aaaaaaaaaaa");
        assert_eq!(request.sources[1].video_id, "bbbbbbbbbbb");
    }

    #[test]
    fn test_from_records_all_failed_yields_empty_request() {
        let records = vec![VideoRecord::failed("u1", "e1"), VideoRecord::failed("u2", "e2")];
        let request =
            GenerationRequest::from_records(&records, Language::Zh, OutputMode::Summary);
        assert!(request.is_empty());
    }

    #[test]
    fn test_mode_default_is_article() {
        assert_eq!(OutputMode::default(), OutputMode::Article);
        assert_eq!(
            serde_json::from_str::<OutputMode>("\"summary\"").unwrap(),
            OutputMode::Summary
        );
    }
}
