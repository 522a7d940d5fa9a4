//! Router tests driven through `tower::ServiceExt::oneshot` with local providers

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use super::state::AppState;
use super::AppServer;
use crate::config::AppConfig;
use crate::generation::prompt::YOUTUBE_SYSTEM;
use crate::providers::{ExtractedImage, LlmProvider};
use crate::testing::{EchoLlm, FailingLlm, KeywordEmbedder, StubTranscripts, TextExtractor};

const BOUNDARY: &str = "digest-rag-test-boundary";
const VIDEO_ID: &str = "dQw4w9WgXcQ";

struct Part<'a> {
    name: &'a str,
    filename: Option<&'a str>,
    content_type: Option<&'a str>,
    data: Vec<u8>,
}

impl<'a> Part<'a> {
    fn file(name: &'a str, filename: &'a str, content_type: &'a str, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name,
            filename: Some(filename),
            content_type: Some(content_type),
            data: data.into(),
        }
    }

    fn text(name: &'a str, value: &str) -> Self {
        Self {
            name,
            filename: None,
            content_type: None,
            data: value.as_bytes().to_vec(),
        }
    }
}

fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let disposition = match part.filename {
            Some(filename) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                part.name, filename
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name),
        };
        body.extend_from_slice(disposition.as_bytes());
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_request(uri: &str, value: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(value.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

struct Harness {
    router: Router,
    state: AppState,
    llm: Arc<EchoLlm>,
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.pdf.max_file_bytes = 4 * 1024;
    config.pdf.max_chunk_chars = 40;
    config.pdf.chunk_overlap = 5;
    config.pdf.max_chunks = 10;
    config
}

fn harness_with(config: AppConfig, images: Vec<ExtractedImage>) -> Harness {
    let llm = Arc::new(EchoLlm::new());
    let transcripts = StubTranscripts::default().with_video(
        VIDEO_ID,
        &[(0, "Never gonna give you up"), (4_000, "never gonna let you down")],
    );
    let state = AppState::from_parts(
        config,
        llm.clone(),
        Arc::new(KeywordEmbedder),
        Arc::new(transcripts),
        Arc::new(TextExtractor { images }),
    );
    let router = AppServer::with_state(state.clone()).build_router();
    Harness { router, state, llm }
}

fn harness() -> Harness {
    harness_with(test_config(), Vec::new())
}

fn error_type(body: &Value) -> &str {
    body["error"]["type"].as_str().unwrap_or("")
}

#[tokio::test]
async fn test_health_and_ready() {
    let h = harness();

    let (status, body) = send(&h.router, get_request("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));

    let (status, _) = send(&h.router, get_request("/ready")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_not_ready_when_llm_unhealthy() {
    let state = AppState::from_parts(
        test_config(),
        Arc::new(FailingLlm::default()),
        Arc::new(KeywordEmbedder),
        Arc::new(StubTranscripts::default()),
        Arc::new(TextExtractor::default()),
    );
    let router = AppServer::with_state(state).build_router();

    let (status, _) = send(&router, get_request("/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_info_reports_store_size() {
    let h = harness();
    let (status, body) = send(&h.router, get_request("/api/info")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "digest-rag");
    assert_eq!(body["store"]["fragments"], 0);
}

#[tokio::test]
async fn test_summarize_youtube() {
    let h = harness();
    let url = format!("https://www.youtube.com/watch?v={}", VIDEO_ID);

    let (status, body) = send(&h.router, json_request("/api/summarizeYoutube", json!({ "url": url }))).await;

    assert_eq!(status, StatusCode::OK);
    let summary = body["summary"].as_str().unwrap();
    assert!(summary.contains("[00:00:00] Never gonna give you up [00:00:04] never gonna let you down"));
    assert_eq!(h.llm.calls(), 1);
    assert_eq!(h.llm.last_request().unwrap().system, YOUTUBE_SYSTEM);
}

#[tokio::test]
async fn test_summarize_youtube_invalid_url() {
    let h = harness();

    let (status, body) = send(
        &h.router,
        json_request("/api/summarizeYoutube", json!({ "url": "https://example.com/watch" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid YouTube URL");
    assert_eq!(h.llm.calls(), 0);

    let (status, _) = send(&h.router, json_request("/api/summarizeYoutube", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_summarize_youtube_without_transcript() {
    let h = harness();

    let (status, body) = send(
        &h.router,
        json_request("/api/summarizeYoutube", json!({ "url": "https://youtu.be/aaaaaaaaaaa" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_type(&body), "no_transcript");
    assert_eq!(h.llm.calls(), 0);
}

#[tokio::test]
async fn test_malformed_json_body() {
    let h = harness();
    let request = Request::builder()
        .method("POST")
        .uri("/api/rag/query")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&h.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_type(&body), "bad_request");
}

#[tokio::test]
async fn test_summarize_pdf_single_call() {
    let h = harness();
    let parts = [Part::file(
        "pdf",
        "short.pdf",
        "application/pdf",
        "Page one.\x0cPage two.",
    )];

    let (status, body) = send(&h.router, multipart_request("/api/summarizePdf", &parts)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], "summary(Page one.\nPage two.)");
    assert_eq!(body["metadata"]["totalPages"], 2);
    assert_eq!(body["metadata"]["chunksProcessed"], 1);
    assert_eq!(h.llm.calls(), 1);
}

#[tokio::test]
async fn test_summarize_pdf_chunked_adds_reduce_call() {
    let h = harness();
    let text = "The first sentence is here. The second sentence follows. A third one ends it.";
    let parts = [
        Part::file("pdf", "long.pdf", "application/pdf", text),
        Part::text("chunkText", "true"),
    ];

    let (status, body) = send(&h.router, multipart_request("/api/summarizePdf", &parts)).await;

    assert_eq!(status, StatusCode::OK);
    let chunks = body["metadata"]["chunksProcessed"].as_u64().unwrap() as usize;
    assert!(chunks > 1);
    assert_eq!(h.llm.calls(), chunks + 1);
}

#[tokio::test]
async fn test_summarize_pdf_with_images() {
    let image = ExtractedImage {
        index: 1,
        mime: "image/jpeg".to_string(),
        data: b"jpeg".to_vec(),
    };
    let h = harness_with(test_config(), vec![image]);
    let parts = [Part::file("pdf", "figure.pdf", "application/pdf", "Short text.")];

    let (status, body) = send(&h.router, multipart_request("/api/summarizePdf", &parts)).await;

    assert_eq!(status, StatusCode::OK);
    let summary = body["summary"].as_str().unwrap();
    assert!(summary.contains("Image Interpretations:\nimage data:image/jpeg;base64,"));
    // One description, one chunk summary, one reduce
    assert_eq!(h.llm.calls(), 3);
}

#[tokio::test]
async fn test_summarize_pdf_too_many_chunks() {
    let h = harness();
    let text = "word ".repeat(200);
    let parts = [
        Part::file("pdf", "big.pdf", "application/pdf", text),
        Part::text("chunkText", "on"),
    ];

    let (status, body) = send(&h.router, multipart_request("/api/summarizePdf", &parts)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(error_type(&body), "payload_too_large");
    assert_eq!(h.llm.calls(), 0);
}

#[tokio::test]
async fn test_summarize_pdf_oversized_file() {
    let h = harness();
    let parts = [Part::file("pdf", "huge.pdf", "application/pdf", vec![b'a'; 5 * 1024])];

    let (status, _) = send(&h.router, multipart_request("/api/summarizePdf", &parts)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(h.llm.calls(), 0);
}

#[tokio::test]
async fn test_summarize_pdf_beyond_body_limit() {
    let h = harness();
    let parts = [Part::file("pdf", "huge.pdf", "application/pdf", vec![b'a'; 200 * 1024])];

    let (status, _) = send(&h.router, multipart_request("/api/summarizePdf", &parts)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(h.llm.calls(), 0);
}

#[tokio::test]
async fn test_summarize_pdf_without_file() {
    let h = harness();
    let parts = [Part::text("chunkText", "true")];

    let (status, body) = send(&h.router, multipart_request("/api/summarizePdf", &parts)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "No file uploaded");
}

#[tokio::test]
async fn test_upload_then_query() {
    let h = harness();
    let parts = [Part::file("file", "notes.md", "text/markdown", "The sky is blue.")];

    let (status, body) = send(&h.router, multipart_request("/api/rag/upload", &parts)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "documentsAdded": 1 }));
    assert_eq!(h.state.store().len(), 1);

    let (status, body) = send(
        &h.router,
        json_request("/api/rag/query", json!({ "question": "What color is the sky?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["answer"].as_str().unwrap().contains("blue"));
}

#[tokio::test]
async fn test_upload_json_array() {
    let h = harness();
    let parts = [Part::file(
        "file",
        "items.json",
        "application/json",
        r#"["apple pie recipe", {"topic": "quantum mechanics"}, "   "]"#,
    )];

    let (status, body) = send(&h.router, multipart_request("/api/rag/upload", &parts)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["documentsAdded"], 2);

    let results = h.state.store().query("how do I bake a dessert", 1).await.unwrap();
    assert_eq!(results[0].fragment.text, "apple pie recipe");
    assert_eq!(results[0].fragment.metadata["source"], "items.json");
    assert_eq!(results[0].fragment.metadata["content_type"], "application/json");
}

#[tokio::test]
async fn test_upload_pdf_pages() {
    let h = harness();
    let parts = [Part::file(
        "file",
        "doc.pdf",
        "application/pdf",
        "The sky is blue.\x0c\x0cApple pie recipe.",
    )];

    let (status, body) = send(&h.router, multipart_request("/api/rag/upload", &parts)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["documentsAdded"], 2);
}

#[tokio::test]
async fn test_upload_detects_type_from_filename() {
    let h = harness();
    let parts = [Part::file(
        "file",
        "readme.markdown",
        "application/octet-stream",
        "# Title\n\nSome text.",
    )];

    let (status, body) = send(&h.router, multipart_request("/api/rag/upload", &parts)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["documentsAdded"], 1);
}

#[tokio::test]
async fn test_upload_rejections() {
    let h = harness();

    let parts = [Part::file("file", "photo.png", "image/png", vec![0u8, 1, 2])];
    let (status, body) = send(&h.router, multipart_request("/api/rag/upload", &parts)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_type(&body), "unsupported_type");

    let parts = [Part::file("file", "bad.json", "application/json", "{oops")];
    let (status, body) = send(&h.router, multipart_request("/api/rag/upload", &parts)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_type(&body), "invalid_json");

    let parts = [Part::text("other", "value")];
    let (status, body) = send(&h.router, multipart_request("/api/rag/upload", &parts)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "No file uploaded");

    let parts = [Part::file("file", "big.md", "text/markdown", vec![b'a'; 5 * 1024])];
    let (status, _) = send(&h.router, multipart_request("/api/rag/upload", &parts)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    assert!(h.state.store().is_empty());
}

#[tokio::test]
async fn test_query_requires_question() {
    let h = harness();

    let (status, body) = send(&h.router, json_request("/api/rag/query", json!({ "question": "  " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "No question provided");
    assert_eq!(h.llm.calls(), 0);
}

#[tokio::test]
async fn test_upstream_failure_is_generic() {
    let llm: Arc<dyn LlmProvider> = Arc::new(FailingLlm::default());
    let state = AppState::from_parts(
        test_config(),
        llm,
        Arc::new(KeywordEmbedder),
        Arc::new(StubTranscripts::default()),
        Arc::new(TextExtractor::default()),
    );
    let router = AppServer::with_state(state).build_router();

    let (status, body) = send(
        &router,
        json_request("/api/rag/query", json!({ "question": "What color is the sky?" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], "Processing failed");
}
