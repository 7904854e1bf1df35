use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("no OCR engine in this build (enable the `tesseract` feature)")]
    NotAvailable,
}

/// Abstraction over an OCR backend.
/// Implementations accept raw PNG/JPEG image bytes and return the recognized text.
pub trait OcrBackend: Send + Sync {
    fn name(&self) -> &'static str;
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;
}

/// Settings for the OCR engine compiled into this build.
#[derive(Debug, Clone)]
pub struct OcrSettings {
    pub language: String,
    pub data_path: Option<PathBuf>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            data_path: None,
        }
    }
}

/// The OCR backend this build was compiled with, if any.
#[cfg(feature = "tesseract")]
pub fn default_backend(settings: &OcrSettings) -> Option<Arc<dyn OcrBackend>> {
    let data_path = settings
        .data_path
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned());
    Some(Arc::new(tesseract_backend::TesseractRecognizer::new(
        data_path,
        &settings.language,
    )))
}

#[cfg(not(feature = "tesseract"))]
pub fn default_backend(_settings: &OcrSettings) -> Option<Arc<dyn OcrBackend>> {
    None
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set string, for exercising extraction without
/// requiring Tesseract to be installed.
pub struct MockRecognizer {
    pub text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrBackend for MockRecognizer {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError};
    use leptess::LepTess;

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn name(&self) -> &'static str {
            "tesseract"
        }

        fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
            // A fresh engine per call: LepTess is not Sync.
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))
        }
    }
}
