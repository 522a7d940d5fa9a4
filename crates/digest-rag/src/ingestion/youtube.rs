//! YouTube URL handling and transcript formatting

use crate::providers::transcript::TranscriptSegment;

/// Extract the video ID from a watch or short URL
///
/// `youtu.be/<id>` takes everything up to `?` or `#`; other URLs use the `v=`
/// parameter, which must be exactly 11 characters long.
pub fn extract_video_id(url: &str) -> Option<String> {
    let url = url.trim();

    let id = if let Some((_, rest)) = url.split_once("youtu.be/") {
        rest.split(['?', '#']).next().unwrap_or("")
    } else {
        let (_, rest) = url.split_once("v=")?;
        let id = rest.split(['?', '#', '&']).next().unwrap_or("");
        if id.chars().count() != 11 {
            return None;
        }
        id
    };

    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    valid.then(|| id.to_string())
}

/// Format milliseconds as `HH:MM:SS`
pub fn format_timestamp(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!(
        "{:02}:{:02}:{:02}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60
    )
}

/// Render segments as `[HH:MM:SS] text`, joined by single spaces
pub fn format_transcript(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| format!("[{}] {}", format_timestamp(s.start_ms), s.text.trim()))
        .collect::<Vec<_>>()
        .join(" ")
}
