//! YouTube URL filtering and video-id extraction.
//!
//! Both are pure string functions with no network access, shared by the
//! ingestion pipeline and the lookup endpoints.

use thiserror::Error;

/// Errors that can occur during video-id extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VideoUrlError {
    /// URL does not reference a known video host
    #[error("not a YouTube URL")]
    InvalidUrl,
    /// A candidate id was found but is not 11 valid id characters
    #[error("video id has invalid format")]
    InvalidId,
    /// No extraction pattern matched the URL
    #[error("no video id found in URL")]
    IdNotFound,
}

/// Result type for video-id extraction.
pub type VideoUrlResult<T> = Result<T, VideoUrlError>;

/// Filter a raw multi-line block of text down to plausible video URLs.
///
/// Each line is trimmed; a line is kept iff it mentions `youtube.com` or
/// `youtu.be`. Order and duplicates are preserved, blank lines are
/// dropped, and empty input yields an empty list rather than an error.
pub fn filter_video_urls(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && is_video_url(line))
        .map(str::to_string)
        .collect()
}

/// Syntactic check that a single line references a YouTube URL.
pub fn is_video_url(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower.contains("youtube.com") || lower.contains("youtu.be")
}

/// Extract the 11-character video id from a URL.
///
/// Supported shapes, tried in a fixed priority order:
/// - `youtube.com/watch?v=VIDEO_ID` (also `&v=`)
/// - `youtube.com/embed/VIDEO_ID`
/// - `youtube.com/v/VIDEO_ID`
/// - `youtube.com/shorts/VIDEO_ID`
/// - `youtube.com/live/VIDEO_ID`
/// - `youtu.be/VIDEO_ID`
///
/// The short-link pattern is tried last, so a URL matching both a
/// query/path shape and the `youtu.be/` shape resolves through the former.
/// The first matching pattern's candidate is validated strictly: exactly
/// 11 characters of `[A-Za-z0-9_-]`, or the whole extraction fails.
pub fn extract_video_id(url: &str) -> VideoUrlResult<String> {
    let url = url.trim();

    if !is_video_url(url) {
        return Err(VideoUrlError::InvalidUrl);
    }

    if let Some(id) = extract_from_watch_url(url) {
        return validate_video_id(id);
    }

    if let Some(id) = extract_from_path(url, "/embed/") {
        return validate_video_id(id);
    }

    if let Some(id) = extract_from_path(url, "/v/") {
        return validate_video_id(id);
    }

    if let Some(id) = extract_from_path(url, "/shorts/") {
        return validate_video_id(id);
    }

    if let Some(id) = extract_from_path(url, "/live/") {
        return validate_video_id(id);
    }

    if let Some(id) = extract_from_path(url, "youtu.be/") {
        return validate_video_id(id);
    }

    Err(VideoUrlError::IdNotFound)
}

/// Extract the id following `?v=` or `&v=`.
fn extract_from_watch_url(url: &str) -> Option<String> {
    let v_pos = url.find("?v=").or_else(|| url.find("&v="))?;
    extract_id_from_segment(&url[v_pos + 3..])
}

/// Extract the id from the path segment following `marker`.
fn extract_from_path(url: &str, marker: &str) -> Option<String> {
    let pos = url.find(marker)?;
    let start = pos + marker.len();
    if start < url.len() {
        extract_id_from_segment(&url[start..])
    } else {
        None
    }
}

/// Cut a candidate id at the first delimiter.
fn extract_id_from_segment(segment: &str) -> Option<String> {
    let delimiters = ['&', '#', '?', '/'];
    let end = segment
        .find(|c| delimiters.contains(&c))
        .unwrap_or(segment.len());
    Some(segment[..end].trim().to_string())
}

fn is_valid_id_chars(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Video ids are exactly 11 characters of the id alphabet.
fn validate_video_id(id: String) -> VideoUrlResult<String> {
    if id.len() != 11 || !is_valid_id_chars(&id) {
        return Err(VideoUrlError::InvalidId);
    }
    Ok(id)
}
