pub mod preprocess;
pub mod recognizer;

pub use preprocess::{prepare_for_ocr, prepare_for_ocr_from_bytes, prepare_image, PreprocessError};
pub use recognizer::{default_backend, MockRecognizer, OcrBackend, OcrError, OcrSettings};
