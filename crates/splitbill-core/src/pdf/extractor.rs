//! Positioned text extraction using lopdf.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace};

use super::{PdfProcessor, Result};
use crate::bill::RawFragment;
use crate::error::PdfError;

type Matrix = [f64; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Average glyph advance as a fraction of the font size.
const GLYPH_WIDTH_RATIO: f64 = 0.5;

/// TJ adjustments (thousandths of an em) at or below this read as a word gap.
const TJ_SPACE_THRESHOLD: f64 = -250.0;

/// `m1 × m2` for PDF row-vector matrices.
fn multiply(m1: &Matrix, m2: &Matrix) -> Matrix {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

fn translation(tx: f64, ty: f64) -> Matrix {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

/// Helper to get a number from an operand.
fn get_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

fn get_matrix(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = IDENTITY;
    for (slot, operand) in m.iter_mut().zip(operands) {
        *slot = get_number(operand)?;
    }
    Some(m)
}

/// Best-effort decoding of raw PDF string bytes.
///
/// Tries UTF-16BE with a byte order mark, then UTF-8, then Latin-1.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let code_units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&code_units);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    bytes.iter().map(|&b| b as char).collect()
}

/// Text and graphics state while walking a content stream.
struct TextState<'a> {
    fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>,
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    font: Vec<u8>,
    font_size: f64,
    leading: f64,
    in_text: bool,
    items: Vec<RawFragment>,
}

impl<'a> TextState<'a> {
    fn new(fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>) -> Self {
        Self {
            fonts,
            ctm: IDENTITY,
            ctm_stack: Vec::new(),
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            font: Vec::new(),
            font_size: 12.0,
            leading: 0.0,
            in_text: false,
            items: Vec::new(),
        }
    }

    fn apply(&mut self, op: &Operation) {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => self.ctm_stack.push(self.ctm),
            "Q" => {
                if let Some(ctm) = self.ctm_stack.pop() {
                    self.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = get_matrix(operands) {
                    self.ctm = multiply(&m, &self.ctm);
                }
            }
            "BT" => {
                self.in_text = true;
                self.text_matrix = IDENTITY;
                self.line_matrix = IDENTITY;
            }
            "ET" => self.in_text = false,
            "Tf" => {
                if operands.len() >= 2 {
                    if let Ok(name) = operands[0].as_name() {
                        self.font = name.to_vec();
                    }
                    if let Some(size) = get_number(&operands[1]) {
                        self.font_size = size;
                    }
                }
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(get_number) {
                    self.leading = leading;
                }
            }
            "Td" | "TD" => {
                if operands.len() >= 2 {
                    let tx = get_number(&operands[0]).unwrap_or(0.0);
                    let ty = get_number(&operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        self.leading = -ty;
                    }
                    self.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = get_matrix(operands) {
                    self.text_matrix = m;
                    self.line_matrix = m;
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(text) = operands.first().and_then(|o| self.decode(o)) {
                    self.show(text);
                }
            }
            "TJ" => {
                if let Some(Ok(array)) = operands.first().map(Object::as_array) {
                    let text = self.decode_array(array);
                    self.show(text);
                }
            }
            "'" => {
                self.next_line();
                if let Some(text) = operands.first().and_then(|o| self.decode(o)) {
                    self.show(text);
                }
            }
            "\"" => {
                self.next_line();
                if let Some(text) = operands.get(2).and_then(|o| self.decode(o)) {
                    self.show(text);
                }
            }
            _ => {}
        }
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = multiply(&translation(tx, ty), &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        // Leading is rarely set explicitly; approximate from the font size
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size * 1.2
        };
        self.move_line(0.0, -leading);
    }

    fn decode(&self, obj: &Object) -> Option<String> {
        let Object::String(bytes, _) = obj else {
            return None;
        };

        if self.is_identity_encoded() && bytes.len() >= 2 && bytes.len() % 2 == 0 {
            let code_units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            let decoded = String::from_utf16_lossy(&code_units);
            if !decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
                return Some(decoded);
            }
        }

        Some(decode_text_simple(bytes))
    }

    fn decode_array(&self, array: &[Object]) -> String {
        let mut text = String::new();
        for item in array {
            match get_number(item) {
                Some(adjust) if adjust <= TJ_SPACE_THRESHOLD => {
                    if !text.is_empty() && !text.ends_with(' ') {
                        text.push(' ');
                    }
                }
                Some(_) => {}
                None => {
                    if let Some(part) = self.decode(item) {
                        text.push_str(&part);
                    }
                }
            }
        }
        text
    }

    fn is_identity_encoded(&self) -> bool {
        self.fonts
            .get(&self.font)
            .and_then(|font| font.get(b"Encoding").ok())
            .and_then(|enc| enc.as_name().ok())
            .is_some_and(|name| name.starts_with(b"Identity"))
    }

    fn show(&mut self, text: String) {
        let glyphs = text.chars().count() as f64;
        let advance = glyphs * self.font_size * GLYPH_WIDTH_RATIO;

        if self.in_text && !text.trim().is_empty() {
            let size = [self.font_size, 0.0, 0.0, self.font_size, 0.0, 0.0];
            let transform = multiply(&multiply(&size, &self.text_matrix), &self.ctm);
            let scale_x = transform[0].hypot(transform[1]);
            let height = transform[2].hypot(transform[3]);

            trace!(
                "Text at ({:.1}, {:.1}): {}",
                transform[4],
                transform[5],
                text
            );

            self.items.push(RawFragment {
                text,
                transform: Some(transform.to_vec()),
                width: glyphs * GLYPH_WIDTH_RATIO * scale_x,
                height,
            });
        }

        self.text_matrix = multiply(&translation(advance, 0.0), &self.text_matrix);
    }
}

/// PDF text-layer reader using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    max_pages: usize,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            max_pages: 0,
        }
    }

    /// Limit how many pages are read (0 = all).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    fn page_items(&self, doc: &Document, page_id: ObjectId) -> Result<Vec<RawFragment>> {
        let fonts = doc.get_page_fonts(page_id).unwrap_or_default();

        let content_data = doc
            .get_page_content(page_id)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        let content =
            Content::decode(&content_data).map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        let mut state = TextState::new(&fonts);
        for op in &content.operations {
            state.apply(op);
        }
        Ok(state.items)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_page_fragments(&self, page: u32) -> Result<Vec<RawFragment>> {
        let doc = self.document()?;
        let pages = doc.get_pages();
        let page_id = pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let items = self.page_items(doc, *page_id)?;
        debug!("Extracted {} text items from page {}", items.len(), page);
        Ok(items)
    }

    fn extract_fragments(&self) -> Result<Vec<Vec<RawFragment>>> {
        let doc = self.document()?;
        let pages = doc.get_pages();
        let limit = if self.max_pages == 0 {
            pages.len()
        } else {
            self.max_pages.min(pages.len())
        };

        if limit < pages.len() {
            debug!("Reading {} of {} pages", limit, pages.len());
        }

        // BTreeMap iterates in ascending page number
        pages
            .values()
            .take(limit)
            .map(|page_id| self.page_items(doc, *page_id))
            .collect()
    }
}
