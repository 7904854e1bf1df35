//! Small in-memory PDFs for tests.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

fn finish(
    mut doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    resources: Dictionary,
) -> Vec<u8> {
    let resources_id = doc.add_object(resources);
    let count = page_ids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(595),
            Object::Integer(842),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("save test pdf");
    buf
}

fn page(doc: &mut Document, pages_id: ObjectId, operations: Vec<Operation>) -> ObjectId {
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("encode content"),
    ));
    doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    })
}

fn font_resources(doc: &mut Document) -> Dictionary {
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    }
}

fn text_operations(lines: &[&str]) -> Vec<Operation> {
    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 10i64.into()]),
        Operation::new("Td", vec![50i64.into(), 750i64.into()]),
    ];
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            ops.push(Operation::new("Td", vec![0i64.into(), (-14i64).into()]));
        }
        ops.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
    }
    ops.push(Operation::new("ET", vec![]));
    ops
}

/// One page, one `Tj` per line, each line 14pt below the previous.
pub fn text_pdf(lines: &[&str]) -> Vec<u8> {
    text_pages_pdf(&[lines])
}

/// One page per entry; the font is inherited from the page tree root.
pub fn text_pages_pdf(pages: &[&[&str]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let resources = font_resources(&mut doc);
    let page_ids = pages
        .iter()
        .map(|lines| page(&mut doc, pages_id, text_operations(lines)))
        .collect();
    finish(doc, pages_id, page_ids, resources)
}

/// A single `TJ` array with a word-gap kerning offset: `[(Service) -300 (A)]`.
pub fn tj_array_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let resources = font_resources(&mut doc);
    let ops = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 10i64.into()]),
        Operation::new("Td", vec![50i64.into(), 750i64.into()]),
        Operation::new(
            "TJ",
            vec![Object::Array(vec![
                Object::string_literal("Service"),
                (-300i64).into(),
                Object::string_literal("A"),
            ])],
        ),
        Operation::new("ET", vec![]),
    ];
    let page_id = page(&mut doc, pages_id, ops);
    finish(doc, pages_id, vec![page_id], resources)
}

fn gray_raster(doc: &mut Document, width: u32, height: u32) -> ObjectId {
    let samples: Vec<u8> = (0..width * height).map(|i| (i % 251) as u8).collect();
    doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "BitsPerComponent" => 8i64,
            "ColorSpace" => "DeviceGray",
        },
        samples,
    ))
}

fn draw_image(name: &str, width: u32, height: u32) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                (width as i64).into(),
                0i64.into(),
                0i64.into(),
                (height as i64).into(),
                0i64.into(),
                0i64.into(),
            ],
        ),
        Operation::new("Do", vec![name.into()]),
        Operation::new("Q", vec![]),
    ]
}

/// An image-only page: an uncompressed 8-bit DeviceGray raster, no text.
pub fn gray_image_pdf(width: u32, height: u32) -> Vec<u8> {
    scanned_pages_pdf(&[(width, height)])
}

/// One gray raster per page, sized `(width, height)`. The rasters are created
/// last page first, so page 1's image has the highest object id. Their
/// `/XObject` map lives on the page tree root and is inherited by every page.
pub fn scanned_pages_pdf(sizes: &[(u32, u32)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut image_ids: Vec<ObjectId> = sizes
        .iter()
        .rev()
        .map(|&(w, h)| gray_raster(&mut doc, w, h))
        .collect();
    image_ids.reverse();

    let mut xobjects = Dictionary::new();
    let mut page_ids = Vec::new();
    for (index, (&(w, h), image_id)) in sizes.iter().zip(image_ids).enumerate() {
        let name = format!("Im{}", index + 1);
        xobjects.set(name.clone(), image_id);
        page_ids.push(page(&mut doc, pages_id, draw_image(&name, w, h)));
    }

    let resources = dictionary! { "XObject" => xobjects };
    finish(doc, pages_id, page_ids, resources)
}

/// Two pages that each carry their own `/Resources`. Page 1 draws only
/// `/ImA`; page 2 lists `/Unused` too but only draws `/ImB`.
pub fn page_local_images_pdf(
    first: (u32, u32),
    second: (u32, u32),
    unused: (u32, u32),
) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let unused_id = gray_raster(&mut doc, unused.0, unused.1);
    let b_id = gray_raster(&mut doc, second.0, second.1);
    let a_id = gray_raster(&mut doc, first.0, first.1);

    let mut page_ids = Vec::new();
    for (draw, resources, size) in [
        ("ImA", dictionary! { "XObject" => dictionary! { "ImA" => a_id } }, first),
        (
            "ImB",
            dictionary! { "XObject" => dictionary! { "Unused" => unused_id, "ImB" => b_id } },
            second,
        ),
    ] {
        let page_id = page(&mut doc, pages_id, draw_image(draw, size.0, size.1));
        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
            dict.set("Resources", resources);
        }
        page_ids.push(page_id);
    }
    finish(doc, pages_id, page_ids, Dictionary::new())
}

/// Answers with the text registered for the width of the (preprocessed) image
/// it is handed, so tests can tell which raster was read and in what order.
pub struct WidthRecognizer {
    texts: Vec<(u32, &'static str)>,
}

impl WidthRecognizer {
    pub fn new(texts: Vec<(u32, &'static str)>) -> Self {
        Self { texts }
    }
}

impl zombie_ocr::OcrBackend for WidthRecognizer {
    fn name(&self) -> &'static str {
        "by-width"
    }

    fn recognize(&self, image_bytes: &[u8]) -> Result<String, zombie_ocr::OcrError> {
        let width = image::load_from_memory(image_bytes)
            .map_err(|e| zombie_ocr::OcrError::ImageDecode(e.to_string()))?
            .width();
        self.texts
            .iter()
            .find(|(w, _)| *w == width)
            .map(|(_, text)| text.to_string())
            .ok_or_else(|| zombie_ocr::OcrError::Engine(format!("no text for width {width}")))
    }
}
