//! YouTube caption retrieval
//!
//! Reads the caption track list embedded in the watch page, picks the best
//! track for the configured language and downloads its timed-text XML.

use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;

use crate::config::YoutubeConfig;
use crate::error::{Error, Result};

use super::transcript::{TranscriptProvider, TranscriptSegment};

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

fn caption_tracks_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r#""captionTracks"\s*:\s*"#).expect("valid regex"))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    #[serde(default)]
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// Transcript provider backed by YouTube's public caption tracks
pub struct YoutubeTranscriptFetcher {
    client: Client,
    config: YoutubeConfig,
}

impl YoutubeTranscriptFetcher {
    /// Create a new fetcher
    pub fn new(config: &YoutubeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header("Accept-Language", format!("{},en;q=0.8", self.config.language))
            .send()
            .await
            .map_err(|e| Error::Transcript(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transcript(format!("HTTP {} from {}", status, url)));
        }

        response
            .text()
            .await
            .map_err(|e| Error::Transcript(format!("failed to read body: {}", e)))
    }

    fn select_track<'a>(&self, tracks: &'a [CaptionTrack]) -> Option<&'a CaptionTrack> {
        let language = self.config.language.as_str();
        let matches_language = |t: &CaptionTrack| {
            t.language_code == language || t.language_code.starts_with(&format!("{}-", language))
        };

        tracks
            .iter()
            .find(|t| matches_language(t) && !t.is_generated())
            .or_else(|| tracks.iter().find(|t| matches_language(t)))
            .or_else(|| tracks.iter().find(|t| !t.is_generated()))
            .or_else(|| tracks.first())
    }

    fn resolve(&self, base_url: &str) -> String {
        if base_url.starts_with('/') {
            format!("{}{}", self.base_url(), base_url)
        } else {
            base_url.to_string()
        }
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeTranscriptFetcher {
    async fn fetch_transcript(&self, video_id: &str) -> Result<Vec<TranscriptSegment>> {
        let watch_url = format!(
            "{}/watch?v={}&hl={}",
            self.base_url(),
            video_id,
            self.config.language
        );
        tracing::debug!("Fetching watch page for {}", video_id);
        let page = self.get_text(&watch_url).await?;

        let tracks = parse_caption_tracks(&page)?;
        let track = self
            .select_track(&tracks)
            .ok_or_else(|| Error::TranscriptUnavailable(video_id.to_string()))?;

        tracing::debug!(
            "Using caption track {} ({}) for {}",
            track.language_code,
            track.kind.as_deref().unwrap_or("manual"),
            video_id
        );

        let xml = self.get_text(&self.resolve(&track.base_url)).await?;
        let segments = parse_timed_text(&xml)?;
        if segments.is_empty() {
            return Err(Error::TranscriptUnavailable(video_id.to_string()));
        }

        tracing::info!("Fetched {} caption segments for {}", segments.len(), video_id);
        Ok(segments)
    }

    fn name(&self) -> &str {
        "youtube"
    }
}

/// Pull the caption track array out of the watch page's player response
fn parse_caption_tracks(page: &str) -> Result<Vec<CaptionTrack>> {
    let Some(marker) = caption_tracks_marker().find(page) else {
        return Ok(Vec::new());
    };

    // Deserialize exactly one JSON value and ignore the rest of the page
    let mut values = serde_json::Deserializer::from_str(&page[marker.end()..])
        .into_iter::<Vec<CaptionTrack>>();

    match values.next() {
        Some(Ok(tracks)) => Ok(tracks),
        Some(Err(e)) => Err(Error::Transcript(format!("malformed caption track list: {}", e))),
        None => Ok(Vec::new()),
    }
}

/// Parse timed-text XML in either the `<text start="secs">` or `<p t="ms">` layout
fn parse_timed_text(xml: &str) -> Result<Vec<TranscriptSegment>> {
    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current: Option<(u64, String)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(tag)) => {
                if let Some(start_ms) = segment_start(&tag)? {
                    current = Some((start_ms, String::new()));
                }
            }
            Ok(Event::Text(text)) => {
                if let Some((_, buffer)) = current.as_mut() {
                    let decoded = text
                        .unescape()
                        .map_err(|e| Error::Transcript(format!("bad caption text: {}", e)))?;
                    buffer.push_str(&decoded);
                }
            }
            Ok(Event::End(tag)) => {
                let name = tag.name();
                if matches!(name.as_ref(), b"text" | b"p") {
                    if let Some((start_ms, raw)) = current.take() {
                        let text = decode_entities(&raw);
                        if !text.is_empty() {
                            segments.push(TranscriptSegment { text, start_ms });
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Error::Transcript(format!(
                    "invalid timed-text XML at {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    Ok(segments)
}

fn segment_start(tag: &BytesStart<'_>) -> Result<Option<u64>> {
    let (attr_name, scale) = match tag.name().as_ref() {
        b"text" => ("start", 1000.0),
        b"p" => ("t", 1.0),
        _ => return Ok(None),
    };

    let attr = tag
        .try_get_attribute(attr_name)
        .map_err(|e| Error::Transcript(format!("bad caption attribute: {}", e)))?;

    let start = attr
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(Some((start * scale).round().max(0.0) as u64))
}

/// Captions are frequently escaped twice (`&amp;#39;`), so decode once more
/// and collapse the embedded line breaks
fn decode_entities(raw: &str) -> String {
    let once = quick_xml::escape::unescape(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    once.split_whitespace().collect::<Vec<_>>().join(" ")
}
