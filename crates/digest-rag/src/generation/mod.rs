//! Summary and answer generation on top of the completion provider

pub mod prompt;
pub mod rag;
pub mod summarizer;

pub use prompt::PromptBuilder;
pub use rag::RagOrchestrator;
pub use summarizer::Summarizer;
