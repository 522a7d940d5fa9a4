//! digest-rag: YouTube and PDF summarization with retrieval-augmented Q&A
//!
//! The crate chunks extracted document text, summarizes it map-then-reduce
//! through a chat-completion provider, and answers questions from an
//! in-memory embedding store filled with uploaded PDF, JSON and Markdown files.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use generation::{RagOrchestrator, Summarizer};
pub use ingestion::TextChunker;
pub use retrieval::DocumentStore;
pub use server::{state::AppState, AppServer};
