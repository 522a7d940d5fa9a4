//! Application state shared by every handler

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::Result;
use crate::generation::{RagOrchestrator, Summarizer};
use crate::ingestion::TextChunker;
use crate::providers::{
    DocumentExtractor, EmbeddingProvider, LlmProvider, OpenAiProvider, PdfExtractor,
    TranscriptProvider, YoutubeTranscriptFetcher,
};
use crate::retrieval::DocumentStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: AppConfig,
    /// Completion provider
    llm: Arc<dyn LlmProvider>,
    /// Embedding provider
    embedder: Arc<dyn EmbeddingProvider>,
    /// Video transcript source
    transcripts: Arc<dyn TranscriptProvider>,
    /// PDF text and image extraction
    extractor: Arc<dyn DocumentExtractor>,
    /// Chunker for PDF summaries
    chunker: TextChunker,
    /// Map-reduce summarizer
    summarizer: Summarizer,
    /// In-memory fragments for RAG
    store: Arc<DocumentStore>,
    /// RAG answer generation
    rag: RagOrchestrator,
}

impl AppState {
    /// Create state backed by the OpenAI, YouTube and PDF providers
    pub fn new(config: AppConfig) -> Result<Self> {
        tracing::info!("Initializing application state...");

        let (embedder, llm) = OpenAiProvider::new(&config.openai)?.split();
        tracing::info!(
            "OpenAI providers initialized (chat: {}, embeddings: {})",
            config.openai.chat_model,
            config.openai.embedding_model
        );

        let transcripts = Arc::new(YoutubeTranscriptFetcher::new(&config.youtube)?);
        let extractor = Arc::new(PdfExtractor::new(Duration::from_secs(
            config.pdf.extract_timeout_secs,
        )));

        Ok(Self::from_parts(
            config,
            Arc::new(llm),
            Arc::new(embedder),
            transcripts,
            extractor,
        ))
    }

    /// Assemble state from explicit providers
    pub fn from_parts(
        config: AppConfig,
        llm: Arc<dyn LlmProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        transcripts: Arc<dyn TranscriptProvider>,
        extractor: Arc<dyn DocumentExtractor>,
    ) -> Self {
        let chunker = TextChunker::new(config.pdf.max_chunk_chars, config.pdf.chunk_overlap);
        let summarizer = Summarizer::new(Arc::clone(&llm), &config.pdf, &config.youtube);
        let store = Arc::new(DocumentStore::new(Arc::clone(&embedder)));
        let rag = RagOrchestrator::new(Arc::clone(&store), Arc::clone(&llm), &config.rag);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                llm,
                embedder,
                transcripts,
                extractor,
                chunker,
                summarizer,
                store,
                rag,
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get completion provider
    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.inner.llm
    }

    /// Get embedding provider
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedder
    }

    /// Get transcript provider
    pub fn transcripts(&self) -> &Arc<dyn TranscriptProvider> {
        &self.inner.transcripts
    }

    /// Get document extractor
    pub fn extractor(&self) -> &Arc<dyn DocumentExtractor> {
        &self.inner.extractor
    }

    /// Get chunker
    pub fn chunker(&self) -> &TextChunker {
        &self.inner.chunker
    }

    /// Get summarizer
    pub fn summarizer(&self) -> &Summarizer {
        &self.inner.summarizer
    }

    /// Get document store
    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.inner.store
    }

    /// Get RAG orchestrator
    pub fn rag(&self) -> &RagOrchestrator {
        &self.inner.rag
    }

    /// Check that the completion and embedding providers respond
    pub async fn is_ready(&self) -> bool {
        let (llm, embedder) = tokio::join!(self.inner.llm.health_check(), self.inner.embedder.health_check());
        matches!((llm, embedder), (Ok(true), Ok(true)))
    }
}
