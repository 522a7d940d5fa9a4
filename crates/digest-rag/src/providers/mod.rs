//! Provider abstractions for completion, embeddings, transcripts and document extraction
//!
//! Trait-based seams keep the orchestration code independent of the OpenAI,
//! YouTube and PDF backends and let tests swap in local stand-ins.

pub mod embedding;
pub mod extractor;
pub mod llm;
pub mod openai;
pub mod pdf;
pub mod transcript;
pub mod youtube;

pub use embedding::EmbeddingProvider;
pub use extractor::{DocumentExtractor, ExtractedImage};
pub use llm::{CompletionRequest, LlmProvider};
pub use openai::{OpenAiEmbedder, OpenAiLlm, OpenAiProvider};
pub use pdf::PdfExtractor;
pub use transcript::{TranscriptProvider, TranscriptSegment};
pub use youtube::YoutubeTranscriptFetcher;
