//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for PDF operations, isolating
//! the concrete PDF library (lopdf) from the content-stream walk.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// Name reported for a font without `/BaseFont` or an unresolvable resource.
pub const UNKNOWN_FONT: &str = "Unknown";

/// Page-tree nesting deeper than this is treated as a reference cycle.
const MAX_PAGE_TREE_DEPTH: usize = 32;

/// Font information returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendFontInfo {
    /// Font resource name (key in the page's font dictionary).
    pub name: Vec<u8>,
    /// Base font name with any subset tag removed (e.g., "Calibri-Bold").
    pub base_font: String,
}

/// A value from a PDF content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// Build an operation (handy for tests and synthetic streams).
    pub fn new(operator: &str, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.to_string(),
            operands,
        }
    }
}

/// Abstract interface for PDF document access.
///
/// Implementations provide page enumeration, font and image resources,
/// content stream decoding, and text decoding without exposing any
/// concrete PDF library types.
pub trait PdfBackend {
    /// PDF version string (e.g., "1.7").
    fn version(&self) -> String;

    /// Return all pages as (page_number → PageId).
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return font info for a given page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>>;

    /// Return the resource names of Image XObjects available to a page.
    fn page_images(&self, page: PageId) -> Result<BTreeSet<Vec<u8>>>;

    /// Return the raw (decompressed) content stream bytes for a page,
    /// or `None` for a page without `/Contents`.
    fn page_content(&self, page: PageId) -> Result<Option<Vec<u8>>>;

    /// Parse raw content stream bytes into a sequence of operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Decode a text byte sequence using the font's encoding on the given page.
    /// Falls back to simple decoding if the font or encoding is unavailable.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Remove a six-letter subset tag (`ABCDEF+Calibri` → `Calibri`).
pub fn strip_subset_tag(base_font: &str) -> &str {
    let bytes = base_font.as_bytes();
    if bytes.len() > 7 && bytes[6] == b'+' && bytes[..6].iter().all(u8::is_ascii_uppercase) {
        &base_font[7..]
    } else {
        base_font
    }
}

// ---------------------------------------------------------------------------
// LopdfBackend: concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
///
/// The parsed document is owned by the backend and released when it is
/// dropped, on success and error paths alike.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from a file path.
    ///
    /// Every failure (missing file, wrong format, broken cross-reference
    /// table, encryption) is reported as [`Error::DocumentOpen`].
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| Error::document_open(path, e))?;
        Self::load_bytes(&data).map_err(|e| Error::document_open(path, e))
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        detect_format_from_bytes(data)?;
        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self { doc })
    }

    /// Load from a reader.
    pub fn load_reader<R: std::io::Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::load_bytes(&data)
    }

    /// Resolve a dictionary that may be stored inline or by reference.
    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match obj {
            Object::Reference(r) => self.doc.get_dictionary(*r).ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Find the `/Resources` dictionary of a page, walking up the page tree
    /// for inherited resources.
    fn page_resources(&self, page_id: PageId) -> Option<&Dictionary> {
        let mut node = self.doc.get_dictionary(page_id).ok();
        for _ in 0..MAX_PAGE_TREE_DEPTH {
            let dict = node?;
            if let Ok(res) = dict.get(b"Resources") {
                return self.resolve_dict(res);
            }
            node = dict
                .get(b"Parent")
                .and_then(Object::as_reference)
                .ok()
                .and_then(|id| self.doc.get_dictionary(id).ok());
        }
        None
    }

    /// Bytes of one content stream object, decompressed when filtered.
    fn stream_bytes(&self, obj: &Object) -> Result<Vec<u8>> {
        let stream = match obj {
            Object::Reference(r) => match self.doc.get_object(*r)? {
                Object::Stream(s) => s,
                _ => return Err(Error::PdfParse("content entry is not a stream".to_string())),
            },
            Object::Stream(s) => s,
            _ => return Err(Error::PdfParse("content entry is not a stream".to_string())),
        };

        if stream.dict.has(b"Filter") {
            stream
                .decompressed_content()
                .map_err(|e| Error::PdfParse(format!("cannot decompress content: {}", e)))
        } else {
            Ok(stream.content.clone())
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>> {
        let lopdf_fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut result = Vec::with_capacity(lopdf_fonts.len());
        for (name, font_dict) in &lopdf_fonts {
            let base_font = font_dict
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| strip_subset_tag(&String::from_utf8_lossy(n)).to_string())
                .unwrap_or_else(|| UNKNOWN_FONT.to_string());
            result.push(BackendFontInfo {
                name: name.clone(),
                base_font,
            });
        }
        Ok(result)
    }

    fn page_images(&self, page: PageId) -> Result<BTreeSet<Vec<u8>>> {
        let mut images = BTreeSet::new();

        let Some(xobjects) = self
            .page_resources(page)
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|obj| self.resolve_dict(obj))
        else {
            return Ok(images);
        };

        for (name, obj) in xobjects.iter() {
            let stream = match obj {
                Object::Reference(r) => self.doc.get_object(*r).ok().and_then(|o| o.as_stream().ok()),
                Object::Stream(s) => Some(s),
                _ => None,
            };
            let is_image = stream
                .and_then(|s| s.dict.get(b"Subtype").ok())
                .and_then(|o| o.as_name().ok())
                .is_some_and(|subtype| subtype == b"Image");
            if is_image {
                images.insert(name.clone());
            }
        }

        Ok(images)
    }

    fn page_content(&self, page_id: PageId) -> Result<Option<Vec<u8>>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(None);
        };

        // /Contents may itself be an indirect array.
        let contents = match contents {
            Object::Reference(r) => match self.doc.get_object(*r)? {
                Object::Array(arr) => Object::Array(arr.clone()),
                _ => contents.clone(),
            },
            other => other.clone(),
        };

        match contents {
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in &arr {
                    content.extend_from_slice(&self.stream_bytes(obj)?);
                    content.push(b' ');
                }
                Ok(Some(content))
            }
            Object::Reference(_) | Object::Stream(_) => Ok(Some(self.stream_bytes(&contents)?)),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content =
            lopdf::content::Content::decode(data).map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        if let Ok(lopdf_fonts) = self.doc.get_page_fonts(page) {
            if let Some(font_dict) = lopdf_fonts.get(font_name) {
                if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                    if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                        return text;
                    }
                }
            }
        }
        decode_text_simple(bytes)
    }
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

/// Helper: extract a number from a [`PdfValue`].
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_simple_utf8() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
    }

    #[test]
    fn test_decode_text_simple_latin1() {
        // 0xE9 = 'é' in Latin-1
        let bytes = vec![0x48, 0x65, 0x6C, 0x6C, 0xE9];
        assert_eq!(decode_text_simple(&bytes), "Hellé");
    }

    #[test]
    fn test_decode_text_simple_utf16be() {
        let bytes = vec![0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text_simple(&bytes), "Hi");
    }

    #[test]
    fn test_strip_subset_tag() {
        assert_eq!(strip_subset_tag("ABCDEF+Calibri"), "Calibri");
        assert_eq!(strip_subset_tag("Calibri"), "Calibri");
        assert_eq!(strip_subset_tag("AbCDEF+Calibri"), "AbCDEF+Calibri");
        assert_eq!(strip_subset_tag("ABCDEF+"), "ABCDEF+");
    }

    #[test]
    fn test_load_bytes_rejects_non_pdf() {
        let result = LopdfBackend::load_bytes(b"PK\x03\x04 not a pdf at all");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_load_file_missing_is_open_error() {
        let result = LopdfBackend::load_file("/nonexistent/resume.pdf");
        assert!(matches!(result, Err(Error::DocumentOpen { .. })));
    }

    #[test]
    fn test_get_number_from_value() {
        assert_eq!(get_number_from_value(&PdfValue::Integer(42)), Some(42.0));
        assert_eq!(get_number_from_value(&PdfValue::Real(10.5)), Some(10.5));
        assert_eq!(get_number_from_value(&PdfValue::Other), None);
    }
}
