use lopdf::Document;
use std::cell::OnceCell;

use crate::PdfError;

/// The raw bytes of one PDF plus a lazily parsed document shared by every
/// lopdf-based backend in a chain run.
pub struct PdfSource<'a> {
    bytes: &'a [u8],
    document: OnceCell<Result<Document, String>>,
}

impl<'a> PdfSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            document: OnceCell::new(),
        }
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn document(&self) -> Result<&Document, PdfError> {
        self.document
            .get_or_init(|| Document::load_mem(self.bytes).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| PdfError::Parse(e.clone()))
    }
}
