//! File → raw rows.
//!
//! The file kind comes from the extension alone. Delimited files are parsed
//! directly; PDFs go through the text fallback chain and images through OCR,
//! after which the recovered text is parsed as delimited text with its own
//! header row.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use zombie_core::{ExtractionConfig, RawRow};
use zombie_import::{read_rows, read_rows_from_str, DelimitedProfile};
use zombie_ocr::{default_backend, prepare_for_ocr, OcrBackend, OcrError, OcrSettings};
use zombie_pdf::PdfExtractionChain;

use crate::error::ExtractError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Delimited,
    Pdf,
    Image,
}

impl FileKind {
    /// Case-insensitive; unknown or missing extensions are treated as delimited text.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("pdf") => FileKind::Pdf,
            Some("png") | Some("jpg") | Some("jpeg") => FileKind::Image,
            _ => FileKind::Delimited,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::Delimited => "delimited",
            FileKind::Pdf => "pdf",
            FileKind::Image => "image",
        }
    }
}

pub struct Extractor {
    profile: DelimitedProfile,
    pdf_chain: PdfExtractionChain,
    ocr: Option<Arc<dyn OcrBackend>>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

impl Extractor {
    /// Uses whichever OCR engine this build was compiled with, if any.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let settings = OcrSettings {
            language: config.ocr_language.clone(),
            data_path: config.tessdata_dir.clone(),
        };
        Self::with_ocr(
            DelimitedProfile::with_delimiter(config.delimiter_byte()),
            default_backend(&settings),
        )
    }

    pub fn with_ocr(profile: DelimitedProfile, ocr: Option<Arc<dyn OcrBackend>>) -> Self {
        Self {
            pdf_chain: PdfExtractionChain::standard(ocr.clone()),
            profile,
            ocr,
        }
    }

    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    pub fn extract_rows(&self, path: &Path) -> Result<Vec<RawRow>, ExtractError> {
        let kind = FileKind::from_path(path);
        let rows = match kind {
            FileKind::Delimited => self.read_delimited(path)?,
            FileKind::Pdf => self.read_pdf(path)?,
            FileKind::Image => self.read_image(path)?,
        };
        info!("Extracted {} rows from {} ({})", rows.len(), path.display(), kind.as_str());
        Ok(rows)
    }

    fn read_delimited(&self, path: &Path) -> Result<Vec<RawRow>, ExtractError> {
        let file = std::fs::File::open(path).map_err(|source| io_error(path, source))?;
        read_rows(file, &self.profile).map_err(|source| ExtractError::Delimited {
            path: path.to_path_buf(),
            source,
        })
    }

    fn read_pdf(&self, path: &Path) -> Result<Vec<RawRow>, ExtractError> {
        let bytes = std::fs::read(path).map_err(|source| io_error(path, source))?;
        let outcome = self
            .pdf_chain
            .extract(&bytes)
            .map_err(|e| ExtractError::ExtractionFailure {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        self.parse_text(path, &outcome.text)
    }

    fn read_image(&self, path: &Path) -> Result<Vec<RawRow>, ExtractError> {
        let Some(ocr) = &self.ocr else {
            return Err(ExtractError::UnsupportedMedia {
                path: path.to_path_buf(),
                reason: OcrError::NotAvailable.to_string(),
            });
        };
        if !path.exists() {
            return Err(io_error(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            ));
        }

        let png = prepare_for_ocr(path).map_err(|e| ExtractError::ExtractionFailure {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let text = ocr.recognize(&png).map_err(|e| ExtractError::ExtractionFailure {
            path: path.to_path_buf(),
            reason: format!("{} OCR: {e}", ocr.name()),
        })?;
        if text.trim().is_empty() {
            return Err(ExtractError::ExtractionFailure {
                path: path.to_path_buf(),
                reason: format!("{} OCR recognized no text", ocr.name()),
            });
        }
        self.parse_text(path, &text)
    }

    fn parse_text(&self, path: &Path, text: &str) -> Result<Vec<RawRow>, ExtractError> {
        read_rows_from_str(text, &self.profile).map_err(|source| ExtractError::Delimited {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ExtractError {
    ExtractError::Io {
        path: PathBuf::from(path),
        source,
    }
}
