use std::panic::{self, AssertUnwindSafe};

use crate::backend::{PdfError, PdfTextBackend};
use crate::source::PdfSource;

/// Direct text-layer extraction via `pdf-extract`.
pub struct TextLayerBackend;

impl PdfTextBackend for TextLayerBackend {
    fn name(&self) -> &'static str {
        "text-layer"
    }

    fn extract(&self, source: &PdfSource<'_>) -> Result<String, PdfError> {
        let bytes = source.bytes();
        // pdf-extract panics on some malformed font programs instead of erroring.
        match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(PdfError::Extract(e.to_string())),
            Err(_) => Err(PdfError::Extract("pdf-extract panicked".to_string())),
        }
    }
}
