//! Transcript provider trait for video captions

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::Result;

/// One caption line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Caption text
    pub text: String,
    /// Offset from the start of the video in milliseconds
    pub start_ms: u64,
}

/// Trait for fetching video transcripts
///
/// Implementations:
/// - `YoutubeTranscriptFetcher`: caption tracks from the YouTube watch page
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the transcript of a video
    ///
    /// Fails with `Error::TranscriptUnavailable` when the video has none.
    async fn fetch_transcript(&self, video_id: &str) -> Result<Vec<TranscriptSegment>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
