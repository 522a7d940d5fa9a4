//! Multipart upload handling and request-scoped temporary files

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::Bytes;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// A file part read from a multipart form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied filename, if any
    pub filename: Option<String>,
    /// Client-supplied content type, if any
    pub content_type: Option<String>,
    /// File bytes
    pub data: Bytes,
}

impl UploadedFile {
    /// Filename for logs and metadata
    pub fn display_name(&self) -> &str {
        self.filename.as_deref().unwrap_or("upload")
    }
}

/// Parsed multipart form: one file field plus plain text fields
#[derive(Debug, Default)]
pub struct UploadForm {
    /// The file field, if present and non-empty
    pub file: Option<UploadedFile>,
    /// Every other field, as text
    pub fields: HashMap<String, String>,
}

/// Read a multipart form, enforcing `max_bytes` on the file field
pub async fn read_upload(mut multipart: Multipart, file_field: &str, max_bytes: usize) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        if name == file_field {
            let filename = field.file_name().map(|s| s.to_string());
            let content_type = field.content_type().map(|s| s.to_string());
            let data = field.bytes().await.map_err(multipart_error)?;

            if data.len() > max_bytes {
                return Err(Error::too_large(format!(
                    "File is {} bytes, the limit is {} bytes",
                    data.len(),
                    max_bytes
                )));
            }
            if data.is_empty() {
                continue;
            }

            tracing::info!(
                "Received upload {} ({} bytes)",
                filename.as_deref().unwrap_or("<unnamed>"),
                data.len()
            );
            form.file = Some(UploadedFile {
                filename,
                content_type,
                data,
            });
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

fn multipart_error(err: MultipartError) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::too_large("Upload exceeds the size limit")
    } else {
        Error::bad_request(format!("Invalid multipart form: {}", err.body_text()))
    }
}

/// Temporary copy of an upload, removed when the request finishes
///
/// Removal failures are logged and never surfaced to the client.
pub struct TempUpload {
    file: Option<NamedTempFile>,
}

impl TempUpload {
    /// Spill bytes to a new temporary file
    pub async fn write(data: Bytes, suffix: &str) -> Result<Self> {
        let suffix = suffix.to_string();
        let file = tokio::task::spawn_blocking(move || -> Result<NamedTempFile> {
            let mut file = tempfile::Builder::new()
                .prefix("digest-rag-")
                .suffix(&suffix)
                .tempfile()?;
            file.write_all(&data)?;
            file.flush()?;
            Ok(file)
        })
        .await
        .map_err(|e| Error::internal(format!("Temp file task failed: {}", e)))??;

        tracing::debug!("Spilled upload to {}", file.path().display());
        Ok(Self { file: Some(file) })
    }

    /// Path of the temporary file
    pub fn path(&self) -> &Path {
        match &self.file {
            Some(file) => file.path(),
            None => Path::new(""),
        }
    }

    /// Remove the file now
    pub fn cleanup(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if let Some(file) = self.file.take() {
            let path = file.path().to_path_buf();
            if let Err(e) = file.close() {
                tracing::warn!("Failed to remove temp file {}: {}", path.display(), e);
            }
        }
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        self.remove();
    }
}
