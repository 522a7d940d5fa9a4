//! Request bodies for the JSON endpoints

use serde::{Deserialize, Serialize};

/// POST /api/summarizeYoutube body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummarizeYoutubeRequest {
    /// Video URL (youtube.com/watch?v=... or youtu.be/...)
    #[serde(default)]
    pub url: String,
}

/// POST /api/rag/query body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagQueryRequest {
    /// The question to answer
    #[serde(default)]
    pub question: String,
}

/// Interpret a multipart form flag such as `chunkText`
pub fn parse_form_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes"
    )
}
