//! API routes for the summarization and RAG server

pub mod pdf;
pub mod rag;
pub mod youtube;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::DocumentExtractor;
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route("/summarizeYoutube", post(youtube::summarize_youtube))
        // Uploads get a body limit sized from the file ceiling
        .route(
            "/summarizePdf",
            post(pdf::summarize_pdf).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route(
            "/rag/upload",
            post(rag::upload_document).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/rag/query", post(rag::query_documents))
        .route("/info", get(info))
}

/// Malformed JSON bodies are client errors
pub(crate) fn json_rejection(err: JsonRejection) -> Error {
    Error::bad_request(format!("Invalid request body: {}", err.body_text()))
}

/// Run a document extractor on the blocking pool
pub(crate) async fn run_extractor<T, F>(state: &AppState, path: &Path, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn DocumentExtractor, &Path) -> Result<T> + Send + 'static,
{
    let extractor = Arc::clone(state.extractor());
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || f(extractor.as_ref(), &path))
        .await
        .map_err(|e| Error::internal(format!("Extraction task failed: {}", e)))?
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.config();
    Json(serde_json::json!({
        "name": "digest-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Video and PDF summaries with retrieval-augmented Q&A",
        "endpoints": {
            "POST /api/summarizeYoutube": "Summarize a YouTube video from its transcript",
            "POST /api/summarizePdf": "Summarize an uploaded PDF (multipart field 'pdf', optional 'chunkText')",
            "POST /api/rag/upload": "Add a PDF, JSON or Markdown file to the document store (multipart field 'file')",
            "POST /api/rag/query": "Answer a question from the stored documents",
            "GET /health": "Liveness check",
            "GET /ready": "Provider readiness check"
        },
        "models": {
            "chat": state.llm().model(),
            "embedding": state.embedder().model()
        },
        "limits": {
            "max_file_bytes": config.pdf.max_file_bytes,
            "max_chunk_chars": config.pdf.max_chunk_chars,
            "max_chunks": config.pdf.max_chunks
        },
        "store": {
            "fragments": state.store().len()
        }
    }))
}
