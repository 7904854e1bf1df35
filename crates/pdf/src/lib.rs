//! Text extraction from PDF statements.
//!
//! [`PdfExtractionChain::standard`] tries, in order: the embedded text layer
//! (`pdf-extract`), lopdf's layout-aware decoder, raw content-stream mining,
//! and finally OCR over the page rasters when an OCR engine is compiled in.

pub mod backend;
pub mod chain;
pub mod images;
pub mod layout;
pub mod raw;
pub mod source;
pub mod text_layer;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{PdfError, PdfTextBackend};
pub use chain::{ChainError, ChainOutcome, PdfExtractionChain};
pub use images::PageImageOcrBackend;
pub use layout::LayoutBackend;
pub use raw::RawContentBackend;
pub use source::PdfSource;
pub use text_layer::TextLayerBackend;
