//! Stored fragments and upload kinds

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use uuid::Uuid;

/// Key-value metadata attached to a fragment
pub type Metadata = HashMap<String, serde_json::Value>;

/// A unit of text held by the document store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    /// Unique fragment ID
    pub id: Uuid,
    /// Fragment text
    pub text: String,
    /// Provenance metadata
    pub metadata: Metadata,
    /// Insertion sequence number, used to break similarity ties
    pub sequence: u64,
}

impl Fragment {
    /// Create a new fragment
    pub fn new(text: String, metadata: Metadata, sequence: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            metadata,
            sequence,
        }
    }
}

/// A fragment returned from a similarity query
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched fragment
    pub fragment: Fragment,
    /// Cosine similarity to the query (-1.0 to 1.0, higher is more similar)
    pub similarity: f32,
}

/// Build the default provenance metadata for one uploaded text
pub fn provenance_metadata(source: &str, part: usize, content_type: &str, text: &str) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("source".to_string(), source.into());
    metadata.insert("part".to_string(), part.into());
    metadata.insert("content_type".to_string(), content_type.into());
    metadata.insert("content_hash".to_string(), hash_content(text).into());
    metadata.insert(
        "ingested_at".to_string(),
        chrono::Utc::now().to_rfc3339().into(),
    );
    metadata
}

/// Fill the keys derivable from the text alone, keeping any already present
pub fn fill_default_metadata(metadata: &mut Metadata, part: usize, text: &str) {
    metadata.entry("part".to_string()).or_insert_with(|| part.into());
    metadata
        .entry("content_hash".to_string())
        .or_insert_with(|| hash_content(text).into());
    metadata
        .entry("ingested_at".to_string())
        .or_insert_with(|| chrono::Utc::now().to_rfc3339().into());
}

/// SHA-256 hex digest of a text
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Upload formats accepted for retrieval
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    /// PDF document, one fragment per page
    Pdf,
    /// JSON document, one fragment per array element
    Json,
    /// Markdown document, stored whole
    Markdown,
}

impl UploadKind {
    /// Detect from a MIME type
    pub fn from_mime(mime: &str) -> Option<Self> {
        // Drop parameters such as "; charset=utf-8"
        let essence = mime.split(';').next().unwrap_or("").trim().to_lowercase();
        match essence.as_str() {
            "application/pdf" => Some(Self::Pdf),
            "application/json" => Some(Self::Json),
            "text/markdown" | "text/x-markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    /// Detect from the declared content type, falling back to the filename
    pub fn detect(content_type: Option<&str>, filename: Option<&str>) -> Option<Self> {
        if let Some(kind) = content_type.and_then(Self::from_mime) {
            return Some(kind);
        }

        let filename = filename?;
        let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();
        if matches!(extension.as_str(), "md" | "markdown") {
            return Some(Self::Markdown);
        }

        mime_guess::from_path(filename)
            .iter()
            .find_map(|mime| Self::from_mime(mime.essence_str()))
    }

    /// Canonical MIME type
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Json => "application/json",
            Self::Markdown => "text/markdown",
        }
    }
}
