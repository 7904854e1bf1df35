use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use zombie_ocr::OcrBackend;

use crate::backend::PdfTextBackend;
use crate::images::PageImageOcrBackend;
use crate::layout::LayoutBackend;
use crate::raw::RawContentBackend;
use crate::source::PdfSource;
use crate::text_layer::TextLayerBackend;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("no extraction backend produced text (tried: {})", .attempted.join(", "))]
    Exhausted { attempted: Vec<&'static str> },
}

/// Text recovered from a PDF and the backend that produced it.
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    pub backend: &'static str,
    pub text: String,
}

/// Fixed-priority list of PDF text backends. The first backend to return
/// non-whitespace text wins; later backends are never run.
pub struct PdfExtractionChain {
    backends: Vec<Box<dyn PdfTextBackend>>,
}

impl PdfExtractionChain {
    pub fn new(backends: Vec<Box<dyn PdfTextBackend>>) -> Self {
        Self { backends }
    }

    /// text layer → layout → raw content mining → page-image OCR.
    /// The OCR stage is only present when this build has an OCR engine.
    pub fn standard(ocr: Option<Arc<dyn OcrBackend>>) -> Self {
        let mut backends: Vec<Box<dyn PdfTextBackend>> = vec![
            Box::new(TextLayerBackend),
            Box::new(LayoutBackend),
            Box::new(RawContentBackend),
        ];
        if let Some(ocr) = ocr {
            backends.push(Box::new(PageImageOcrBackend::new(ocr)));
        }
        Self::new(backends)
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    pub fn extract(&self, pdf: &[u8]) -> Result<ChainOutcome, ChainError> {
        let source = PdfSource::new(pdf);
        let mut attempted = Vec::with_capacity(self.backends.len());

        for backend in &self.backends {
            attempted.push(backend.name());
            match backend.extract(&source) {
                Ok(text) if !text.trim().is_empty() => {
                    info!("PDF text extracted by {} ({} bytes)", backend.name(), text.len());
                    return Ok(ChainOutcome {
                        backend: backend.name(),
                        text,
                    });
                }
                Ok(_) => debug!("{}: no text", backend.name()),
                Err(e) => debug!("{}: {e}", backend.name()),
            }
        }

        Err(ChainError::Exhausted { attempted })
    }
}
