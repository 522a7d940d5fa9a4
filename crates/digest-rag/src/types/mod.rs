//! Core types for the service

pub mod document;
pub mod query;
pub mod response;

pub use document::{Fragment, Metadata, SearchResult, UploadKind};
pub use query::{RagQueryRequest, SummarizeYoutubeRequest};
pub use response::{
    AnswerResponse, PdfSummaryMetadata, PdfSummaryResponse, SummaryResponse, UploadResponse,
};
