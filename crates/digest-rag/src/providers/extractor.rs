//! Document extractor trait for page text and embedded images

use base64::Engine;
use std::path::Path;

use crate::error::Result;

/// An image embedded in a document
#[derive(Debug, Clone)]
pub struct ExtractedImage {
    /// Position of the image in document order (1-indexed)
    pub index: usize,
    /// MIME type of `data`
    pub mime: String,
    /// Encoded image bytes
    pub data: Vec<u8>,
}

impl ExtractedImage {
    /// Encode as a `data:` URI for vision input
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            base64::engine::general_purpose::STANDARD.encode(&self.data)
        )
    }
}

/// Trait for extracting content from uploaded documents
///
/// Extraction is CPU-bound; callers run it on the blocking pool.
///
/// Implementations:
/// - `PdfExtractor`: pdf-extract for text, lopdf for images
pub trait DocumentExtractor: Send + Sync {
    /// Extract the text of every page, in page order
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>>;

    /// Extract embedded images that can be passed to a vision model
    fn extract_images(&self, path: &Path) -> Result<Vec<ExtractedImage>>;

    /// Get extractor name for logging
    fn name(&self) -> &str;
}
