//! Retrieval-augmented answering over the document store

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::providers::{CompletionRequest, LlmProvider};
use crate::retrieval::DocumentStore;

use super::prompt::{PromptBuilder, RAG_SYSTEM};

/// Answers questions from retrieved fragments
pub struct RagOrchestrator {
    store: Arc<DocumentStore>,
    llm: Arc<dyn LlmProvider>,
    config: RagConfig,
}

impl RagOrchestrator {
    /// Create a new orchestrator
    pub fn new(store: Arc<DocumentStore>, llm: Arc<dyn LlmProvider>, config: &RagConfig) -> Self {
        Self {
            store,
            llm,
            config: config.clone(),
        }
    }

    /// Answer a question using the top matching fragments as context
    pub async fn answer(&self, question: &str) -> Result<String> {
        let results = self.store.query(question, self.config.top_k).await?;
        tracing::info!(
            "Answering with {} context fragments from {}",
            results.len(),
            self.llm.name()
        );

        let context = PromptBuilder::build_context(&results);
        let request = CompletionRequest::new(
            RAG_SYSTEM,
            PromptBuilder::build_rag_user_turn(question, &context),
            self.config.max_tokens,
            self.config.temperature,
        );

        self.llm.complete(&request).await
    }
}
