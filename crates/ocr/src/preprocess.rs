use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Scans larger than this on either side are scaled down before OCR.
const MAX_DIMENSION: u32 = 2800;
/// Statement snippets narrower than this are scaled up; small glyphs OCR poorly.
const MIN_WIDTH: u32 = 1000;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Load an image file, apply normalization, and return PNG bytes ready for OCR.
pub fn prepare_for_ocr(path: &Path) -> Result<Vec<u8>, PreprocessError> {
    let img = image::open(path)?;
    prepare_image(img)
}

/// Process raw image bytes (JPEG / PNG / …) and return normalized PNG bytes.
pub fn prepare_for_ocr_from_bytes(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let img = image::load_from_memory(data)?;
    prepare_image(img)
}

/// Normalize an already-decoded image (e.g. a raster pulled out of a PDF).
pub fn prepare_image(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    encode_as_png(normalize(rescale(img)))
}

fn rescale(img: DynamicImage) -> DynamicImage {
    let (w, h) = (img.width(), img.height());
    if w > MAX_DIMENSION || h > MAX_DIMENSION {
        debug!("Downscaling {w}x{h} scan to fit {MAX_DIMENSION}px");
        img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
    } else if w > 0 && w < MIN_WIDTH {
        let factor = (MIN_WIDTH / w).clamp(1, 4);
        if factor > 1 {
            debug!("Upscaling {w}x{h} image by {factor}x");
            img.resize(w * factor, h * factor, FilterType::CatmullRom)
        } else {
            img
        }
    } else {
        img
    }
}

/// Grayscale + contrast stretch.
fn normalize(img: DynamicImage) -> DynamicImage {
    let gray: GrayImage = img.to_luma8();

    let (min_px, max_px) = gray
        .pixels()
        .fold((255u8, 0u8), |(mn, mx), p| (mn.min(p[0]), mx.max(p[0])));

    if max_px <= min_px {
        // Uniform (or empty) image: nothing to stretch.
        return DynamicImage::ImageLuma8(gray);
    }

    let range = (max_px - min_px) as u32;
    let stretched: GrayImage = ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let p = gray.get_pixel(x, y)[0];
        Luma([((p - min_px) as u32 * 255 / range) as u8])
    });

    DynamicImage::ImageLuma8(stretched)
}

fn encode_as_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}
