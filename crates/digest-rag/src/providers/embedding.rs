//! Embedding provider trait

use async_trait::async_trait;
use futures::future::try_join_all;

use crate::error::Result;

/// Trait for turning text into fixed-length vectors
///
/// Implementations:
/// - `OpenAiEmbedder`: OpenAI-compatible embeddings API (text-embedding-3-small)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, returning vectors in input order
    ///
    /// The default issues one `embed` call per text concurrently; providers
    /// with a native batch endpoint should override it.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        try_join_all(texts.iter().map(|text| self.embed(text))).await
    }

    /// Vector length produced by this provider
    fn dimensions(&self) -> usize;

    /// Check if the provider is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Embedding model in use
    fn model(&self) -> &str;
}
