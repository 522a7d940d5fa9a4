//! Map-then-reduce summarization over a completion provider

use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;

use crate::config::{PdfConfig, YoutubeConfig};
use crate::error::{Error, Result};
use crate::providers::{CompletionRequest, ExtractedImage, LlmProvider};

use super::prompt::{PromptBuilder, IMAGE_DESCRIPTION, SUMMARY_SYSTEM, YOUTUBE_SYSTEM};

/// Summarizes chunked documents, embedded images and video transcripts
pub struct Summarizer {
    llm: Arc<dyn LlmProvider>,
    max_tokens: u32,
    temperature: f32,
    max_concurrent: usize,
    video_max_tokens: u32,
    video_temperature: f32,
}

impl Summarizer {
    /// Create a new summarizer
    pub fn new(llm: Arc<dyn LlmProvider>, pdf: &PdfConfig, youtube: &YoutubeConfig) -> Self {
        Self {
            llm,
            max_tokens: pdf.summary_max_tokens,
            temperature: pdf.summary_temperature,
            max_concurrent: pdf.max_concurrent_requests.max(1),
            video_max_tokens: youtube.summary_max_tokens,
            video_temperature: youtube.temperature,
        }
    }

    /// Summarize a single text
    pub async fn summarize_one(&self, text: &str) -> Result<String> {
        let request = CompletionRequest::new(SUMMARY_SYSTEM, text, self.max_tokens, self.temperature);
        self.llm.complete(&request).await
    }

    /// Summarize every chunk, then combine the partial summaries
    ///
    /// A single chunk without image notes is returned after one call. Any
    /// failed chunk fails the whole summary.
    pub async fn summarize(&self, chunks: &[String], image_notes: &[String]) -> Result<String> {
        if chunks.is_empty() {
            return Err(Error::bad_request("No text content to summarize"));
        }

        tracing::debug!(
            "Summarizing {} chunks ({} image notes) with {}",
            chunks.len(),
            image_notes.len(),
            self.llm.model()
        );

        let mut summaries = self
            .map_in_order(chunks, |chunk| self.summarize_one(chunk))
            .await?;

        if summaries.len() == 1 && image_notes.is_empty() {
            return Ok(summaries.remove(0));
        }

        let combined = PromptBuilder::build_reduce_input(&summaries, image_notes);
        self.summarize_one(&combined).await
    }

    /// Describe embedded images, in document order
    pub async fn describe_images(&self, images: &[ExtractedImage]) -> Result<Vec<String>> {
        self.map_in_order(images, |image| async move {
            let uri = image.to_data_uri();
            self.llm.describe_image(&uri, IMAGE_DESCRIPTION).await
        })
        .await
    }

    /// Summarize a timestamped video transcript
    pub async fn summarize_transcript(&self, transcript: &str) -> Result<String> {
        let request = CompletionRequest::new(
            YOUTUBE_SYSTEM,
            transcript,
            self.video_max_tokens,
            self.video_temperature,
        );
        self.llm.complete(&request).await
    }

    /// Run `f` over `items` with bounded concurrency, keeping results positional
    async fn map_in_order<'a, T, F, Fut>(&self, items: &'a [T], f: F) -> Result<Vec<String>>
    where
        F: Fn(&'a T) -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let mut results: Vec<Option<String>> = vec![None; items.len()];

        // Built up front so the stream holds no closure across awaits
        let calls: Vec<_> = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let call = f(item);
                async move { (index, call.await) }
            })
            .collect();
        let mut pending = stream::iter(calls).buffer_unordered(self.max_concurrent);

        while let Some((index, result)) = pending.next().await {
            results[index] = Some(result?);
        }

        results
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| Error::internal("summary stream ended before all items completed"))
    }
}
