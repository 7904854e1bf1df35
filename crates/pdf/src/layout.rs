use crate::backend::{PdfError, PdfTextBackend};
use crate::source::PdfSource;

/// Page-by-page extraction through lopdf's font-aware text decoder.
pub struct LayoutBackend;

impl PdfTextBackend for LayoutBackend {
    fn name(&self) -> &'static str {
        "layout"
    }

    fn extract(&self, source: &PdfSource<'_>) -> Result<String, PdfError> {
        let doc = source.document()?;
        let mut out = String::new();
        for page_number in doc.get_pages().into_keys() {
            match doc.extract_text(&[page_number]) {
                Ok(text) => {
                    out.push_str(text.trim_end());
                    out.push('\n');
                }
                Err(e) => tracing::debug!("layout: page {page_number} unreadable: {e}"),
            }
        }
        Ok(out)
    }
}
