//! LLM provider trait for text completion and image description

use async_trait::async_trait;
use crate::error::Result;

/// A single system + user turn sent to the model
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Fixed instruction for the model
    pub system: String,
    /// User turn content
    pub user: String,
    /// Output token ceiling
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl CompletionRequest {
    /// Create a new completion request
    pub fn new(system: impl Into<String>, user: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens,
            temperature,
        }
    }
}

/// Trait for chat-completion models
///
/// Implementations:
/// - `OpenAiLlm`: OpenAI-compatible chat completions API (gpt-4o-mini)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a system + user exchange
    ///
    /// Returns an empty string when the model produced no content.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Describe an image given as a `data:` URI
    async fn describe_image(&self, image_data_uri: &str, instruction: &str) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
