//! PDF summary endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::server::upload::{read_upload, TempUpload};
use crate::types::{query::parse_form_flag, PdfSummaryMetadata, PdfSummaryResponse};

use super::run_extractor;

/// POST /api/summarizePdf - Summarize an uploaded PDF
///
/// Multipart fields: `pdf` (the file) and optional `chunkText`. Without
/// `chunkText` the whole document is summarized in one call.
pub async fn summarize_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PdfSummaryResponse>> {
    let start = Instant::now();
    let limits = &state.config().pdf;

    let form = read_upload(multipart, "pdf", limits.max_file_bytes).await?;
    let file = form
        .file
        .ok_or_else(|| Error::bad_request("No file uploaded"))?;
    let chunk_text = form
        .fields
        .get("chunkText")
        .map(|value| parse_form_flag(value))
        .unwrap_or(false);

    let upload = TempUpload::write(file.data.clone(), ".pdf").await?;
    let result = summarize_upload(&state, &upload, chunk_text).await;
    upload.cleanup();
    let response = result?;

    tracing::info!(
        "Summarized {} ({} pages, {} chunks) in {:.1}s",
        file.display_name(),
        response.metadata.total_pages,
        response.metadata.chunks_processed,
        start.elapsed().as_secs_f64()
    );
    Ok(Json(response))
}

async fn summarize_upload(state: &AppState, upload: &TempUpload, chunk_text: bool) -> Result<PdfSummaryResponse> {
    let limits = &state.config().pdf;

    let pages = run_extractor(state, upload.path(), |extractor, path| {
        extractor.extract_pages(path)
    })
    .await?;

    let text = pages
        .iter()
        .map(|page| page.trim())
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    // The chunk ceiling applies before any completion call, in both modes
    let mut chunks = state.chunker().chunk_with_limit(&text, limits.max_chunks)?;
    if !chunk_text && !chunks.is_empty() {
        chunks = vec![text];
    }

    let image_notes = if limits.interpret_images && !chunks.is_empty() {
        describe_embedded_images(state, upload).await?
    } else {
        Vec::new()
    };

    let summary = state.summarizer().summarize(&chunks, &image_notes).await?;

    Ok(PdfSummaryResponse {
        summary,
        metadata: PdfSummaryMetadata {
            total_pages: pages.len(),
            chunks_processed: chunks.len(),
        },
    })
}

async fn describe_embedded_images(state: &AppState, upload: &TempUpload) -> Result<Vec<String>> {
    let max_images = state.config().pdf.max_images;

    let mut images = match run_extractor(state, upload.path(), |extractor, path| {
        extractor.extract_images(path)
    })
    .await
    {
        Ok(images) => images,
        Err(e) => {
            tracing::warn!("Image extraction failed, summarizing text only: {}", e);
            return Ok(Vec::new());
        }
    };

    if images.len() > max_images {
        tracing::info!("Describing {} of {} embedded images", max_images, images.len());
        images.truncate(max_images);
    }

    state.summarizer().describe_images(&images).await
}
