//! Document ingestion: chunking, upload parsing and video helpers

pub mod chunker;
pub mod parser;
pub mod youtube;

pub use chunker::TextChunker;
pub use youtube::{extract_video_id, format_transcript};
