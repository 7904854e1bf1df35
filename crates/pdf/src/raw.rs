use lopdf::content::Content;
use lopdf::Object;

use crate::backend::{PdfError, PdfTextBackend};
use crate::source::PdfSource;

/// TJ offsets more negative than this (thousandths of an em) read as a space.
const TJ_SPACE_THRESHOLD: f64 = -200.0;

/// Last-resort text mining: walks each page's content stream and collects the
/// string operands of text-showing operators, ignoring fonts and encodings.
pub struct RawContentBackend;

impl PdfTextBackend for RawContentBackend {
    fn name(&self) -> &'static str {
        "raw-content"
    }

    fn extract(&self, source: &PdfSource<'_>) -> Result<String, PdfError> {
        let doc = source.document()?;
        let mut out = String::new();
        for (page_number, page_id) in doc.get_pages() {
            let content = match doc
                .get_page_content(page_id)
                .and_then(|data| Content::decode(&data))
            {
                Ok(content) => content,
                Err(e) => {
                    tracing::debug!("raw-content: skipping page {page_number}: {e}");
                    continue;
                }
            };
            mine_operations(&content, &mut out);
            end_line(&mut out);
        }
        Ok(out)
    }
}

fn mine_operations(content: &Content, out: &mut String) {
    for op in &content.operations {
        match op.operator.as_str() {
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    push_bytes(out, bytes);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => push_bytes(out, bytes),
                            other => {
                                if number(other).is_some_and(|n| n < TJ_SPACE_THRESHOLD) {
                                    out.push(' ');
                                }
                            }
                        }
                    }
                }
            }
            "'" | "\"" => {
                end_line(out);
                if let Some(Object::String(bytes, _)) = op.operands.last() {
                    push_bytes(out, bytes);
                }
            }
            "T*" | "ET" => end_line(out),
            "Td" | "TD" => {
                let ty = op.operands.get(1).and_then(number).unwrap_or(0.0);
                if ty != 0.0 {
                    end_line(out);
                }
            }
            _ => {}
        }
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// Content-stream strings carry no reliable encoding here; read them as Latin-1
/// and drop control bytes so binary junk never reaches the row parser.
fn push_bytes(out: &mut String, bytes: &[u8]) {
    out.extend(
        bytes
            .iter()
            .map(|&b| b as char)
            .filter(|c| !c.is_control() || *c == '\t'),
    );
}

fn end_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}
