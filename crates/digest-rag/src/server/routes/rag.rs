//! Document upload and question endpoints for retrieval-augmented Q&A

use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    Json,
};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::ingestion::parser::{pages_to_texts, parse_json, parse_markdown};
use crate::server::state::AppState;
use crate::server::upload::{read_upload, TempUpload, UploadedFile};
use crate::types::document::provenance_metadata;
use crate::types::{AnswerResponse, Metadata, RagQueryRequest, UploadKind, UploadResponse};

use super::{json_rejection, run_extractor};

/// POST /api/rag/upload - Add a PDF, JSON or Markdown file to the document store
pub async fn upload_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let start = Instant::now();

    let form = read_upload(multipart, "file", state.config().pdf.max_file_bytes).await?;
    let file = form.file.ok_or_else(|| Error::bad_request("No file uploaded"))?;

    let kind = UploadKind::detect(file.content_type.as_deref(), file.filename.as_deref())
        .ok_or_else(|| {
            Error::UnsupportedFileType(
                file.content_type
                    .clone()
                    .unwrap_or_else(|| file.display_name().to_string()),
            )
        })?;

    let texts = extract_texts(&state, &file, kind).await?;
    let source = file.display_name();
    let metadata: Vec<Metadata> = texts
        .iter()
        .enumerate()
        .map(|(part, text)| provenance_metadata(source, part, kind.mime(), text))
        .collect();

    let documents_added = state.store().add_documents(texts, metadata).await?;

    tracing::info!(
        "Added {} fragments from {} ({}) in {:.1}s",
        documents_added,
        source,
        kind.mime(),
        start.elapsed().as_secs_f64()
    );
    Ok(Json(UploadResponse {
        success: true,
        documents_added,
    }))
}

async fn extract_texts(state: &AppState, file: &UploadedFile, kind: UploadKind) -> Result<Vec<String>> {
    match kind {
        UploadKind::Pdf => {
            let upload = TempUpload::write(file.data.clone(), ".pdf").await?;
            let pages = run_extractor(state, upload.path(), |extractor, path| {
                extractor.extract_pages(path)
            })
            .await;
            upload.cleanup();
            Ok(pages_to_texts(&pages?))
        }
        UploadKind::Json => parse_json(&file.data),
        UploadKind::Markdown => Ok(parse_markdown(&file.data)),
    }
}

/// POST /api/rag/query - Answer a question from the stored documents
pub async fn query_documents(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RagQueryRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>> {
    let start = Instant::now();
    let Json(request) = payload.map_err(json_rejection)?;

    let question = request.question.trim();
    if question.is_empty() {
        return Err(Error::bad_request("No question provided"));
    }

    tracing::info!("Question: \"{}\"", question);
    let answer = state.rag().answer(question).await?;

    tracing::info!("Answered in {:.1}s", start.elapsed().as_secs_f64());
    Ok(Json(AnswerResponse { answer }))
}
