use thiserror::Error;
use zombie_ocr::{OcrError, PreprocessError};

use crate::source::PdfSource;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parse error: {0}")]
    Parse(String),
    #[error("Text extraction error: {0}")]
    Extract(String),
    #[error("Malformed content stream: {0}")]
    Content(#[from] lopdf::Error),
    #[error("No decodable page images")]
    NoImages,
    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),
}

/// One way of getting text out of a PDF. Backends are tried in priority order
/// by [`crate::PdfExtractionChain`]; an error or blank text means "try the next".
pub trait PdfTextBackend: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, source: &PdfSource<'_>) -> Result<String, PdfError>;
}
