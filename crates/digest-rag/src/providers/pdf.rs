//! PDF extraction with pdf-extract for text and lopdf for images

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::ingestion::parser::cleanup_pdf_text;

use super::extractor::{DocumentExtractor, ExtractedImage};

const EXTRACT_THREAD: &str = "pdf-extract";

/// Upper bound on reference chains and page-tree depth
const MAX_DEPTH: usize = 32;

/// Extracts per-page text and JPEG images from PDF files
pub struct PdfExtractor {
    /// Time allowed for pdf-extract before falling back to lopdf
    timeout: Duration,
}

impl PdfExtractor {
    /// Create a new extractor
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run pdf-extract on its own thread so problematic fonts cannot hang the request
    fn extract_with_timeout(&self, data: Vec<u8>) -> std::result::Result<Vec<String>, String> {
        let (tx, rx) = mpsc::channel();

        thread::Builder::new()
            .name(EXTRACT_THREAD.to_string())
            .spawn(move || {
                let result =
                    pdf_extract::extract_text_from_mem_by_pages(&data).map_err(|e| e.to_string());
                let _ = tx.send(result);
            })
            .map_err(|e| format!("could not start extraction thread: {}", e))?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                // The thread cannot be cancelled; it exits once pdf-extract returns
                tracing::warn!(
                    "pdf-extract exceeded {:?}; thread '{}' is still running in the background",
                    self.timeout,
                    EXTRACT_THREAD
                );
                Err(format!("timed out after {:?}", self.timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err("extraction thread panicked".to_string()),
        }
    }

    /// Page text straight from content streams, used when pdf-extract fails
    fn extract_with_lopdf(data: &[u8], filename: &str) -> Result<Vec<String>> {
        let doc = Document::load_mem(data)
            .map_err(|e| Error::file_parse(filename, format!("Failed to load PDF: {}", e)))?;

        let pages = doc.get_pages();
        let mut texts = Vec::with_capacity(pages.len());
        for page_num in pages.keys() {
            match doc.extract_text(&[*page_num]) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    tracing::debug!("Could not extract text from page {}: {}", page_num, e);
                    texts.push(String::new());
                }
            }
        }

        Ok(texts)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

impl DocumentExtractor for PdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>> {
        let filename = display_name(path);
        let data = std::fs::read(path)?;

        let pages = match self.extract_with_timeout(data.clone()) {
            Ok(pages) => pages,
            Err(e) => {
                tracing::warn!("pdf-extract failed on {}: {}, trying fallback", filename, e);
                Self::extract_with_lopdf(&data, &filename)?
            }
        };

        tracing::debug!("Extracted {} pages from {}", pages.len(), filename);
        Ok(pages.iter().map(|page| cleanup_pdf_text(page)).collect())
    }

    fn extract_images(&self, path: &Path) -> Result<Vec<ExtractedImage>> {
        let filename = display_name(path);
        let doc = Document::load(path)
            .map_err(|e| Error::file_parse(&filename, format!("Failed to load PDF: {}", e)))?;

        let mut images = Vec::new();
        let mut skipped = 0usize;
        let mut seen = HashSet::new();

        // Pages in reading order, each page's XObjects in resource order
        let image_ids = doc
            .get_pages()
            .into_values()
            .flat_map(|page_id| page_xobject_ids(&doc, page_id));

        for id in image_ids {
            if !seen.insert(id) {
                continue;
            }
            let Ok(Object::Stream(stream)) = doc.get_object(id) else {
                continue;
            };
            if !is_image(&stream.dict) {
                continue;
            }
            // Only JPEG streams can be handed to the vision model as-is
            if !is_plain_jpeg(&stream.dict) {
                skipped += 1;
                continue;
            }
            images.push(ExtractedImage {
                index: images.len() + 1,
                mime: "image/jpeg".to_string(),
                data: stream.content.clone(),
            });
        }

        if skipped > 0 {
            tracing::debug!("Skipped {} non-JPEG images in {}", skipped, filename);
        }
        Ok(images)
    }

    fn name(&self) -> &str {
        "pdf"
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string())
}

/// Follow references until a direct object is reached
fn resolve<'a>(doc: &'a Document, mut object: &'a Object) -> Option<&'a Object> {
    for _ in 0..MAX_DEPTH {
        match object {
            Object::Reference(id) => object = doc.get_object(*id).ok()?,
            direct => return Some(direct),
        }
    }
    None
}

/// The page's resource dictionary, inherited from the page tree when absent
fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_DEPTH {
        if let Ok(resources) = node.get(b"Resources") {
            return resolve(doc, resources)?.as_dict().ok();
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Object IDs of the XObjects a page references
fn page_xobject_ids(doc: &Document, page_id: ObjectId) -> Vec<ObjectId> {
    let Some(xobjects) = page_resources(doc, page_id)
        .and_then(|resources| resources.get(b"XObject").ok())
        .and_then(|xobjects| resolve(doc, xobjects))
        .and_then(|xobjects| xobjects.as_dict().ok())
    else {
        return Vec::new();
    };

    xobjects
        .iter()
        .filter_map(|(_, object)| object.as_reference().ok())
        .collect()
}

fn is_image(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name.as_slice() == b"Image")
}

fn is_plain_jpeg(dict: &Dictionary) -> bool {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => name.as_slice() == b"DCTDecode",
        Ok(Object::Array(filters)) => {
            filters.len() == 1
                && matches!(&filters[0], Object::Name(name) if name.as_slice() == b"DCTDecode")
        }
        _ => false,
    }
}
