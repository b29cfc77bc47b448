//! Caption transcript retrieval via the InnerTube player API.
//!
//! YouTube's public Data API does not expose caption text without OAuth,
//! so this module goes through the web client's own flow: fetch the watch
//! page, lift the InnerTube API key out of it, ask the player endpoint for
//! caption tracks, then download and flatten the chosen track's XML.

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::client::YoutubeClient;
use crate::error::{YoutubeError, YoutubeResult};
use crate::retry::with_retry;

/// Caption languages tried in order; the first available track wins.
pub const TRANSCRIPT_LANGUAGE_PRIORITY: [&str; 3] = ["en", "ja", "zh"];

/// Watch pages are only served in full to browser user agents.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const INNERTUBE_CLIENT_VERSION: &str = "2.20241126.01.00";

#[derive(Debug, Deserialize)]
struct PlayerResponse {
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
}

impl YoutubeClient {
    /// Fetch the transcript for a video, honoring the language priority:
    /// for each preferred code, an exact track match wins, then a regional
    /// variant (`en` matches `en-US`). No matching track means no
    /// transcript, not a fallback to an arbitrary language.
    pub async fn fetch_transcript(
        &self,
        video_id: &str,
        preferred: &[&str],
    ) -> YoutubeResult<String> {
        with_retry(&self.config.retry, "fetch_transcript", || async {
            self.fetch_transcript_once(video_id, preferred).await
        })
        .await
    }

    async fn fetch_transcript_once(
        &self,
        video_id: &str,
        preferred: &[&str],
    ) -> YoutubeResult<String> {
        let watch_url = format!("{}/watch?v={video_id}", self.config.watch_base_url);
        debug!(%watch_url, "fetching watch page");

        let response = self
            .http
            .get(&watch_url)
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?;
        let page_html = Self::check_response("watch_page", response)
            .await?
            .text()
            .await?;

        let api_key = extract_api_key(&page_html)?;

        let player_url = format!(
            "{}/youtubei/v1/player?key={api_key}&prettyPrint=false",
            self.config.watch_base_url
        );
        let hl = preferred.first().copied().unwrap_or("en");
        let body = serde_json::json!({
            "context": {
                "client": {
                    "hl": hl,
                    "gl": "US",
                    "clientName": "WEB",
                    "clientVersion": INNERTUBE_CLIENT_VERSION
                }
            },
            "videoId": video_id
        });

        let response = self
            .http
            .post(&player_url)
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .json(&body)
            .send()
            .await?;
        let player: PlayerResponse = Self::check_response("innertube_player", response)
            .await?
            .json()
            .await
            .map_err(|e| YoutubeError::parse(format!("innertube player: {e}")))?;

        let tracks = player
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .map(|r| r.caption_tracks)
            .unwrap_or_default();

        let track = select_track(&tracks, preferred)
            .ok_or_else(|| YoutubeError::TranscriptUnavailable(video_id.to_string()))?;
        debug!(language = %track.language_code, "selected caption track");

        let response = self
            .http
            .get(&track.base_url)
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?;
        let caption_xml = Self::check_response("caption_xml", response)
            .await?
            .text()
            .await?;

        let segments = parse_caption_xml(&caption_xml)?;
        if segments.is_empty() {
            return Err(YoutubeError::TranscriptUnavailable(video_id.to_string()));
        }
        Ok(segments.join(" "))
    }
}

/// Pick the first track satisfying the priority list.
fn select_track<'a>(tracks: &'a [CaptionTrack], preferred: &[&str]) -> Option<&'a CaptionTrack> {
    for lang in preferred {
        if let Some(track) = tracks.iter().find(|t| t.language_code == *lang) {
            return Some(track);
        }
        if let Some(track) = tracks.iter().find(|t| base_code(&t.language_code) == *lang) {
            return Some(track);
        }
    }
    None
}

/// `en-US` and `en_US` both reduce to `en`.
fn base_code(code: &str) -> &str {
    code.split(['-', '_']).next().unwrap_or(code)
}

fn extract_api_key(html: &str) -> YoutubeResult<String> {
    let re = Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#)
        .map_err(|e| YoutubeError::parse(format!("api key pattern: {e}")))?;
    if let Some(caps) = re.captures(html) {
        return Ok(caps[1].to_string());
    }

    // Newer pages inline the key under a different name.
    let re2 = Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#)
        .map_err(|e| YoutubeError::parse(format!("api key pattern: {e}")))?;
    if let Some(caps) = re2.captures(html) {
        return Ok(caps[1].to_string());
    }

    Err(YoutubeError::parse(
        "could not extract InnerTube API key from watch page",
    ))
}

/// Flatten caption XML into its text segments. Caption text arrives
/// double-encoded, so entities are decoded twice.
fn parse_caption_xml(xml: &str) -> YoutubeResult<Vec<String>> {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                in_text = true;
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => {
                in_text = false;
            }
            Ok(Event::Text(ref e)) if in_text => {
                let raw = e.unescape().unwrap_or_default().to_string();
                let text = html_escape::decode_html_entities(&raw).trim().to_string();
                if !text.is_empty() {
                    segments.push(text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(YoutubeError::parse(format!("caption XML: {e}"))),
            _ => {}
        }
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::YoutubeConfig;
    use crate::retry::RetryConfig;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn track(lang: &str) -> CaptionTrack {
        CaptionTrack {
            base_url: format!("https://example.invalid/timedtext/{lang}"),
            language_code: lang.to_string(),
        }
    }

    #[test]
    fn test_select_track_follows_priority_order() {
        let tracks = vec![track("zh"), track("ja")];
        let chosen = select_track(&tracks, &TRANSCRIPT_LANGUAGE_PRIORITY).unwrap();
        assert_eq!(chosen.language_code, "ja");
    }

    #[test]
    fn test_select_track_priority_beats_track_position() {
        let tracks = vec![track("ja"), track("en-GB")];
        let chosen = select_track(&tracks, &TRANSCRIPT_LANGUAGE_PRIORITY).unwrap();
        assert_eq!(chosen.language_code, "en-GB");
    }

    #[test]
    fn test_select_track_matches_regional_variants() {
        let tracks = vec![track("en-US")];
        let chosen = select_track(&tracks, &["en"]).unwrap();
        assert_eq!(chosen.language_code, "en-US");
    }

    #[test]
    fn test_select_track_no_match() {
        let tracks = vec![track("ko"), track("de")];
        assert!(select_track(&tracks, &TRANSCRIPT_LANGUAGE_PRIORITY).is_none());
    }

    #[test]
    fn test_extract_api_key() {
        let html = r#"var cfg = {};"INNERTUBE_API_KEY":"AIzaSyTest123";more"#;
        assert_eq!(extract_api_key(html).unwrap(), "AIzaSyTest123");
    }

    #[test]
    fn test_extract_api_key_fallback_pattern() {
        let html = r#"innertubeApiKey="AIzaSyFallback";"#;
        assert_eq!(extract_api_key(html).unwrap(), "AIzaSyFallback");
    }

    #[test]
    fn test_extract_api_key_missing() {
        assert!(extract_api_key("<html><body>nothing</body></html>").is_err());
    }

    #[test]
    fn test_parse_caption_xml_basic() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<transcript>
    <text start="0.21" dur="2.34">Hello world</text>
    <text start="2.55" dur="1.50">This is a test</text>
</transcript>"#;
        let segments = parse_caption_xml(xml).unwrap();
        assert_eq!(segments, vec!["Hello world", "This is a test"]);
    }

    #[test]
    fn test_parse_caption_xml_decodes_double_encoded_entities() {
        let xml = r#"<transcript><text start="0" dur="1">it&amp;#39;s &amp;quot;here&amp;quot;</text></transcript>"#;
        let segments = parse_caption_xml(xml).unwrap();
        assert_eq!(segments, vec!["it's \"here\""]);
    }

    #[test]
    fn test_parse_caption_xml_empty_transcript() {
        let segments = parse_caption_xml(r#"<transcript></transcript>"#).unwrap();
        assert!(segments.is_empty());
    }

    fn test_client(base_url: &str) -> YoutubeClient {
        YoutubeClient::new(YoutubeConfig {
            api_key: "unused".to_string(),
            api_base_url: base_url.to_string(),
            watch_base_url: base_url.to_string(),
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            max_results: 5,
            retry: RetryConfig {
                max_retries: 1,
                base_delay_ms: 1,
                max_delay_ms: 2,
            },
        })
        .unwrap()
    }

    async fn mount_watch_page(server: &MockServer, video_id: &str) {
        Mock::given(method("GET"))
            .and(path("/watch"))
            .and(query_param("v", video_id))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html>"INNERTUBE_API_KEY":"inner-test-key"</html>"#,
            ))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetch_transcript_full_flow() {
        let server = MockServer::start().await;
        mount_watch_page(&server, "dQw4w9WgXcQ").await;

        Mock::given(method("POST"))
            .and(path("/youtubei/v1/player"))
            .and(query_param("key", "inner-test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "captions": {
                    "playerCaptionsTracklistRenderer": {
                        "captionTracks": [
                            { "baseUrl": format!("{}/timedtext?lang=ko", server.uri()), "languageCode": "ko" },
                            { "baseUrl": format!("{}/timedtext?lang=ja", server.uri()), "languageCode": "ja" }
                        ]
                    }
                }
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/timedtext"))
            .and(query_param("lang", "ja"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<transcript><text start="0" dur="1">Hello there</text><text start="1" dur="2">General words</text></transcript>"#,
            ))
            .mount(&server)
            .await;

        let transcript = test_client(&server.uri())
            .fetch_transcript("dQw4w9WgXcQ", &TRANSCRIPT_LANGUAGE_PRIORITY)
            .await
            .unwrap();

        assert_eq!(transcript, "Hello there General words");
    }

    #[tokio::test]
    async fn test_fetch_transcript_no_captions() {
        let server = MockServer::start().await;
        mount_watch_page(&server, "dQw4w9WgXcQ").await;

        Mock::given(method("POST"))
            .and(path("/youtubei/v1/player"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .fetch_transcript("dQw4w9WgXcQ", &TRANSCRIPT_LANGUAGE_PRIORITY)
            .await
            .unwrap_err();
        assert!(matches!(err, YoutubeError::TranscriptUnavailable(id) if id == "dQw4w9WgXcQ"));
    }

    #[tokio::test]
    async fn test_fetch_transcript_no_preferred_language() {
        let server = MockServer::start().await;
        mount_watch_page(&server, "dQw4w9WgXcQ").await;

        Mock::given(method("POST"))
            .and(path("/youtubei/v1/player"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "captions": {
                    "playerCaptionsTracklistRenderer": {
                        "captionTracks": [
                            { "baseUrl": format!("{}/timedtext?lang=ko", server.uri()), "languageCode": "ko" }
                        ]
                    }
                }
            })))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .fetch_transcript("dQw4w9WgXcQ", &TRANSCRIPT_LANGUAGE_PRIORITY)
            .await
            .unwrap_err();
        assert!(matches!(err, YoutubeError::TranscriptUnavailable(_)));
    }
}
