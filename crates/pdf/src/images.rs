use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::sync::Arc;
use zombie_ocr::{prepare_for_ocr_from_bytes, prepare_image, OcrBackend};

use crate::backend::{PdfError, PdfTextBackend};
use crate::source::PdfSource;

/// Scanned statements are image-only: walk the pages in order and OCR every
/// raster each page draws, following the page tree for inherited resources.
pub struct PageImageOcrBackend {
    ocr: Arc<dyn OcrBackend>,
}

impl PageImageOcrBackend {
    pub fn new(ocr: Arc<dyn OcrBackend>) -> Self {
        Self { ocr }
    }
}

impl PdfTextBackend for PageImageOcrBackend {
    fn name(&self) -> &'static str {
        "page-image-ocr"
    }

    fn extract(&self, source: &PdfSource<'_>) -> Result<String, PdfError> {
        let doc = source.document()?;
        let mut pages = Vec::new();

        for (page_number, page_id) in doc.get_pages() {
            for (name, image_id) in page_images(doc, page_id) {
                let Ok(stream) = doc.get_object(image_id).and_then(Object::as_stream) else {
                    continue;
                };
                if !is_image(&stream.dict) {
                    continue;
                }
                let png = match decode_image(stream) {
                    Ok(Some(png)) => png,
                    Ok(None) => {
                        tracing::debug!(
                            "page-image-ocr: page {page_number} /{name}: unsupported encoding"
                        );
                        continue;
                    }
                    Err(e) => {
                        tracing::debug!("page-image-ocr: page {page_number} /{name}: {e}");
                        continue;
                    }
                };
                pages.push(self.ocr.recognize(&png)?);
            }
        }

        if pages.is_empty() {
            return Err(PdfError::NoImages);
        }
        Ok(pages.join("\n"))
    }
}

/// XObjects a page paints with `Do`, in drawing order, resolved against the
/// nearest `/Resources /XObject` up the page tree.
fn page_images(doc: &Document, page_id: ObjectId) -> Vec<(String, ObjectId)> {
    let Some(xobjects) = inherited_xobjects(doc, page_id) else {
        return Vec::new();
    };
    let content = match doc.get_page_content(page_id).and_then(|data| Content::decode(&data)) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!("page-image-ocr: unreadable content stream: {e}");
            return Vec::new();
        }
    };

    content
        .operations
        .iter()
        .filter(|op| op.operator == "Do")
        .filter_map(|op| op.operands.first().and_then(name_of))
        .filter_map(|name| {
            let id = xobjects.get(name).ok()?.as_reference().ok()?;
            Some((String::from_utf8_lossy(name).into_owned(), id))
        })
        .collect()
}

fn inherited_xobjects(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok();
    while let Some(dict) = node {
        let xobjects = dict
            .get(b"Resources")
            .ok()
            .and_then(|res| resolve_dict(doc, res))
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|xobj| resolve_dict(doc, xobj));
        if xobjects.is_some() {
            return xobjects;
        }
        node = dict
            .get(b"Parent")
            .and_then(Object::as_reference)
            .and_then(|id| doc.get_dictionary(id))
            .ok();
    }
    None
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict),
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        _ => None,
    }
}

fn name_of(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::Name(name) => Some(name.as_slice()),
        _ => None,
    }
}

fn is_image(dict: &Dictionary) -> bool {
    dict.get(b"Subtype").ok().and_then(name_of) == Some(b"Image".as_slice())
}

fn int_field(dict: &Dictionary, key: &[u8]) -> Option<u32> {
    match dict.get(key).ok()? {
        Object::Integer(i) => u32::try_from(*i).ok(),
        _ => None,
    }
}

fn filters(dict: &Dictionary) -> Vec<&[u8]> {
    match dict.get(b"Filter") {
        Ok(Object::Array(items)) => items.iter().filter_map(name_of).collect(),
        Ok(other) => name_of(other).into_iter().collect(),
        Err(_) => Vec::new(),
    }
}

/// Returns OCR-ready PNG bytes, or `None` when the encoding isn't one we can
/// rebuild (JPX, CCITT, indexed palettes, non-8-bit samples).
fn decode_image(stream: &Stream) -> Result<Option<Vec<u8>>, PdfError> {
    let dict = &stream.dict;
    let filters = filters(dict);

    if filters == [b"DCTDecode".as_slice()] {
        return Ok(Some(prepare_for_ocr_from_bytes(&stream.content)?));
    }
    if filters.iter().any(|f| *f != b"FlateDecode".as_slice()) {
        return Ok(None);
    }

    let (Some(width), Some(height)) = (int_field(dict, b"Width"), int_field(dict, b"Height")) else {
        return Ok(None);
    };
    if int_field(dict, b"BitsPerComponent") != Some(8) {
        return Ok(None);
    }

    let samples = if filters.is_empty() {
        stream.content.clone()
    } else {
        stream.decompressed_content()?
    };

    let color_space = dict.get(b"ColorSpace").ok().and_then(name_of);
    let image = match color_space {
        Some(b"DeviceGray") => {
            GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8)
        }
        Some(b"DeviceRGB") => {
            RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8)
        }
        _ => None,
    };

    match image {
        Some(image) => Ok(Some(prepare_image(image)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        gray_image_pdf, page_local_images_pdf, scanned_pages_pdf, text_pdf, WidthRecognizer,
    };
    use zombie_ocr::MockRecognizer;

    fn backend(text: &str) -> PageImageOcrBackend {
        PageImageOcrBackend::new(Arc::new(MockRecognizer::new(text)))
    }

    #[test]
    fn ocrs_embedded_gray_raster() {
        let pdf = gray_image_pdf(16, 8);
        let text = backend("Date,Description,Amount\n2024-01-15,Gym,30")
            .extract(&PdfSource::new(&pdf))
            .unwrap();
        assert!(text.contains("Gym"));
    }

    #[test]
    fn pages_are_read_in_page_order_not_object_order() {
        // Page 1's raster has the higher object id; 16 and 32 px come out 64 and 128 wide.
        let pdf = scanned_pages_pdf(&[(16, 8), (32, 8)]);
        let ocr = WidthRecognizer::new(vec![
            (64, "Date,Description,Amount\n2024-01-15,Gym,30"),
            (128, "2024-02-15,Gym,30"),
        ]);
        let text = PageImageOcrBackend::new(Arc::new(ocr))
            .extract(&PdfSource::new(&pdf))
            .unwrap();
        assert_eq!(text, "Date,Description,Amount\n2024-01-15,Gym,30\n2024-02-15,Gym,30");
    }

    #[test]
    fn page_local_resources_and_undrawn_images() {
        let pdf = page_local_images_pdf((16, 8), (32, 8), (24, 8));
        let ocr = WidthRecognizer::new(vec![(64, "first"), (128, "second"), (96, "never drawn")]);
        let text = PageImageOcrBackend::new(Arc::new(ocr))
            .extract(&PdfSource::new(&pdf))
            .unwrap();
        assert_eq!(text, "first\nsecond");
    }

    #[test]
    fn text_only_pdf_has_no_images() {
        let pdf = text_pdf(&["hello"]);
        assert!(matches!(
            backend("ignored").extract(&PdfSource::new(&pdf)),
            Err(PdfError::NoImages)
        ));
    }

    #[test]
    fn truncated_raster_is_skipped() {
        // Declares 16x8 but only carries 10 samples.
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", Object::Integer(16));
        dict.set("Height", Object::Integer(8));
        dict.set("BitsPerComponent", Object::Integer(8));
        dict.set("ColorSpace", Object::Name(b"DeviceGray".to_vec()));
        let stream = Stream::new(dict, vec![0u8; 10]);
        assert!(decode_image(&stream).unwrap().is_none());
    }

    #[test]
    fn unsupported_filter_is_skipped() {
        let mut dict = Dictionary::new();
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Filter", Object::Name(b"JPXDecode".to_vec()));
        let stream = Stream::new(dict, vec![1, 2, 3]);
        assert!(decode_image(&stream).unwrap().is_none());
    }
}
