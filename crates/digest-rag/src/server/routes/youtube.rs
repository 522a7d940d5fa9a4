//! Video summary endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::ingestion::{extract_video_id, format_transcript};
use crate::server::state::AppState;
use crate::types::{SummarizeYoutubeRequest, SummaryResponse};

use super::json_rejection;

/// POST /api/summarizeYoutube - Summarize a video from its transcript
pub async fn summarize_youtube(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SummarizeYoutubeRequest>, JsonRejection>,
) -> Result<Json<SummaryResponse>> {
    let start = Instant::now();
    let Json(request) = payload.map_err(json_rejection)?;

    let video_id = extract_video_id(&request.url)
        .ok_or_else(|| Error::bad_request("Invalid YouTube URL"))?;
    tracing::info!("Summarizing video {}", video_id);

    let segments = state.transcripts().fetch_transcript(&video_id).await?;
    if segments.is_empty() {
        return Err(Error::TranscriptUnavailable(video_id));
    }

    let transcript = format_transcript(&segments);
    let summary = state.summarizer().summarize_transcript(&transcript).await?;

    tracing::info!(
        "Summarized video {} ({} segments) in {:.1}s",
        video_id,
        segments.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(Json(SummaryResponse { summary }))
}
