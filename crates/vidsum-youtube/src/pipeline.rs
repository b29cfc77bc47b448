//! Multi-video ingestion pipeline.
//!
//! Takes validated URLs and produces one [`VideoRecord`] per URL, in input
//! order. Every per-video failure is captured in its record; processing of
//! the remaining URLs always continues. URLs are fetched sequentially,
//! which keeps ordering trivial and the upstream request rate polite.

use tracing::{info, warn};
use vidsum_models::{extract_video_id, VideoRecord, VideoRef, VideoSource};

use crate::client::YoutubeClient;
use crate::error::YoutubeResult;
use crate::transcript::TRANSCRIPT_LANGUAGE_PRIORITY;

/// The per-URL records of one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub records: Vec<VideoRecord>,
}

impl IngestOutcome {
    /// True when every record failed. The caller aborts only in this case;
    /// partial failure still produces output.
    pub fn all_failed(&self) -> bool {
        !self.records.is_empty() && self.records.iter().all(VideoRecord::is_failed)
    }

    pub fn fetched_count(&self) -> usize {
        self.records.len() - self.failed_count()
    }

    pub fn failed_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_failed()).count()
    }

    /// Successfully fetched sources, in input order.
    pub fn fetched(&self) -> impl Iterator<Item = &VideoSource> {
        self.records.iter().filter_map(VideoRecord::as_source)
    }

    /// `(url, error)` pairs for the failed records, in input order.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.records.iter().filter_map(|record| match record {
            VideoRecord::Failed { url, error } => Some((url.as_str(), error.as_str())),
            VideoRecord::Fetched(_) => None,
        })
    }

    /// The first failure message, used when reporting a fully failed run.
    pub fn first_failure(&self) -> Option<&str> {
        self.failures().next().map(|(_, error)| error)
    }
}

/// Ingest a batch of URLs: one record per URL, same order, failures
/// isolated per item.
pub async fn ingest_urls(client: &YoutubeClient, urls: &[String]) -> IngestOutcome {
    let mut records = Vec::with_capacity(urls.len());

    for url in urls {
        let record = match fetch_source(client, url).await {
            Ok(source) => {
                info!(url = %url, video_id = %source.video_id, "ingested video");
                VideoRecord::Fetched(source)
            }
            Err(e) => {
                warn!(url = %url, error = %e, "failed to ingest video");
                VideoRecord::failed(url, e)
            }
        };
        records.push(record);
    }

    let outcome = IngestOutcome { records };
    info!(
        total = outcome.records.len(),
        failed = outcome.failed_count(),
        "ingestion complete"
    );
    outcome
}

/// Fetch everything needed for one video: id, snippet, transcript.
async fn fetch_source(client: &YoutubeClient, url: &str) -> YoutubeResult<VideoSource> {
    let video = VideoRef::new(url, extract_video_id(url)?);
    let details = client.video_details(&video.video_id).await?;
    let transcript = client
        .fetch_transcript(&video.video_id, &TRANSCRIPT_LANGUAGE_PRIORITY)
        .await?;

    Ok(VideoSource {
        url: video.raw_url,
        video_id: video.video_id,
        title: details.title,
        description: details.description,
        transcript,
        channel_id: details.channel_id,
        thumbnail_url: details.thumbnail_url,
    })
}
