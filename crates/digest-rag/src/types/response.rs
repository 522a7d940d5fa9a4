//! Response bodies for the JSON endpoints

use serde::{Deserialize, Serialize};

/// Summary of a video or single-shot document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Summary of an uploaded PDF
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfSummaryResponse {
    pub summary: String,
    pub metadata: PdfSummaryMetadata,
}

/// Processing details for a PDF summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfSummaryMetadata {
    /// Pages in the uploaded document
    pub total_pages: usize,
    /// Chunks summarized in the map phase
    pub chunks_processed: usize,
}

/// Result of a retrieval upload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub documents_added: usize,
}

/// Answer to a retrieval query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let body = serde_json::to_value(PdfSummaryResponse {
            summary: "short".to_string(),
            metadata: PdfSummaryMetadata {
                total_pages: 3,
                chunks_processed: 2,
            },
        })
        .unwrap();
        assert_eq!(body["metadata"]["totalPages"], 3);
        assert_eq!(body["metadata"]["chunksProcessed"], 2);

        let body = serde_json::to_value(UploadResponse {
            success: true,
            documents_added: 5,
        })
        .unwrap();
        assert_eq!(body["documentsAdded"], 5);
    }
}
