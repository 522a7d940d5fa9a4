//! Local provider stand-ins for unit and router tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::providers::{
    CompletionRequest, DocumentExtractor, EmbeddingProvider, ExtractedImage, LlmProvider,
    TranscriptProvider, TranscriptSegment,
};

/// Keyword groups, one embedding dimension each
const TOPICS: &[&[&str]] = &[
    &["bake", "dessert", "pie", "apple", "recipe", "cake"],
    &["quantum", "mechanics", "physics", "particle"],
    &["sky", "blue", "color", "colour"],
];

/// Embeds text by counting topic keywords, plus a constant bias dimension
pub struct KeywordEmbedder;

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let mut vector: Vec<f32> = TOPICS
            .iter()
            .map(|topic| words.iter().filter(|w| topic.contains(*w)).count() as f32)
            .collect();
        vector.push(1.0);
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        TOPICS.len() + 1
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "keyword"
    }

    fn model(&self) -> &str {
        "keyword-v1"
    }
}

/// Completion stand-in that answers `summary(<user turn>)` and records calls
pub struct EchoLlm {
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
    delay_ms: fn(&str) -> u64,
}

impl Default for EchoLlm {
    fn default() -> Self {
        Self::with_delay(|_| 0)
    }
}

impl EchoLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay each completion by `delay_ms(user turn)` milliseconds
    pub fn with_delay(delay_ms: fn(&str) -> u64) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            delay_ms,
        }
    }

    /// Completion and image calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl LlmProvider for EchoLlm {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        let delay = (self.delay_ms)(&request.user);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Ok(format!("summary({})", request.user))
    }

    async fn describe_image(&self, image_data_uri: &str, _instruction: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("image {}", image_data_uri))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "echo"
    }

    fn model(&self) -> &str {
        "echo-1"
    }
}

/// Completion stand-in that always fails
#[derive(Default)]
pub struct FailingLlm {
    calls: AtomicUsize,
}

impl FailingLlm {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for FailingLlm {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::llm("upstream unavailable"))
    }

    async fn describe_image(&self, _image_data_uri: &str, _instruction: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::llm("upstream unavailable"))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn model(&self) -> &str {
        "none"
    }
}

/// Transcripts served from a fixed map of video IDs
#[derive(Default)]
pub struct StubTranscripts {
    videos: HashMap<String, Vec<TranscriptSegment>>,
}

impl StubTranscripts {
    pub fn with_video(mut self, video_id: &str, lines: &[(u64, &str)]) -> Self {
        let segments = lines
            .iter()
            .map(|(start_ms, text)| TranscriptSegment {
                text: text.to_string(),
                start_ms: *start_ms,
            })
            .collect();
        self.videos.insert(video_id.to_string(), segments);
        self
    }
}

#[async_trait]
impl TranscriptProvider for StubTranscripts {
    async fn fetch_transcript(&self, video_id: &str) -> Result<Vec<TranscriptSegment>> {
        self.videos
            .get(video_id)
            .cloned()
            .ok_or_else(|| Error::TranscriptUnavailable(video_id.to_string()))
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Treats uploads as UTF-8 text with form feeds between pages
#[derive(Default)]
pub struct TextExtractor {
    pub images: Vec<ExtractedImage>,
}

impl DocumentExtractor for TextExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>> {
        let data = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&data)
            .split('\x0c')
            .map(|page| page.to_string())
            .collect())
    }

    fn extract_images(&self, _path: &Path) -> Result<Vec<ExtractedImage>> {
        Ok(self.images.clone())
    }

    fn name(&self) -> &str {
        "text"
    }
}
