//! Error types for the summarization and RAG service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, Error>;

/// Service errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or invalid request input
    #[error("{0}")]
    BadRequest(String),

    /// Uploaded JSON could not be decoded
    #[error("Invalid JSON upload: {0}")]
    InvalidJson(String),

    /// Unsupported upload type
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// File too large or document produces too many chunks
    #[error("{0}")]
    PayloadTooLarge(String),

    /// The video has no transcript
    #[error("No transcript available: {0}")]
    TranscriptUnavailable(String),

    /// Transcript retrieval failed
    #[error("Transcript retrieval failed: {0}")]
    Transcript(String),

    /// File parsing error
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Chat completion error
    #[error("LLM error: {0}")]
    Llm(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create a payload-too-large error
    pub fn too_large(message: impl Into<String>) -> Self {
        Self::PayloadTooLarge(message.into())
    }

    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status this error maps to at the API boundary
    pub fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) | Error::InvalidJson(_) | Error::UnsupportedFileType(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::TranscriptUnavailable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Config(_)
            | Error::Transcript(_)
            | Error::FileParse { .. }
            | Error::Embedding(_)
            | Error::Llm(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::Http(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            Error::Config(_) => "config_error",
            Error::BadRequest(_) => "bad_request",
            Error::InvalidJson(_) => "invalid_json",
            Error::UnsupportedFileType(_) => "unsupported_type",
            Error::PayloadTooLarge(_) => "payload_too_large",
            Error::TranscriptUnavailable(_) => "no_transcript",
            Error::Transcript(_) => "transcript_error",
            Error::FileParse { .. } => "parse_error",
            Error::Embedding(_) => "embedding_error",
            Error::Llm(_) => "llm_error",
            Error::Io(_) => "io_error",
            Error::Json(_) => "json_error",
            Error::Http(_) => "http_error",
            Error::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        // Upstream failures get a generic message; the detail only goes to the log
        let message = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            "Processing failed".to_string()
        } else {
            tracing::info!("Request rejected ({}): {}", status, self);
            self.to_string()
        };

        let body = Json(json!({
            "error": {
                "type": self.error_type(),
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
