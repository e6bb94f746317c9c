//! Layout analysis for PDF pages.
//!
//! Walks each page's content stream, tracking text and graphics state, and
//! turns it into the block/line/span structure of [`crate::model`]: shown
//! strings become spans, spans are grouped into lines by baseline, lines into
//! blocks by spacing, and every placed image becomes an image block.

use std::collections::{BTreeSet, HashMap};

use crate::error::{Error, Result};
use crate::model::{Block, Document, ImageBlock, Page, TextBlock, TextLine, TextSpan};

use super::backend::{
    get_number_from_value, ContentOp, PageId, PdfBackend, PdfValue, UNKNOWN_FONT,
};

/// Default marker searched for as a horizontal rule.
pub const DEFAULT_RULE_MARKER: &str = "________";

/// `TJ` adjustments beyond this many thousandths of an em read as a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Layout analyzer turning content streams into pages of blocks.
pub struct LayoutAnalyzer<'a, B: PdfBackend> {
    backend: &'a B,
    rule_marker: String,
}

impl<'a, B: PdfBackend> LayoutAnalyzer<'a, B> {
    /// Create a new layout analyzer.
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            rule_marker: DEFAULT_RULE_MARKER.to_string(),
        }
    }

    /// Use a different horizontal-rule marker.
    pub fn with_rule_marker(mut self, marker: impl Into<String>) -> Self {
        self.rule_marker = marker.into();
        self
    }

    /// Walk every page of the document.
    ///
    /// Any page that cannot be decomposed fails the whole document.
    pub fn extract_document(&self) -> Result<Document> {
        let mut document = Document::new();
        document.pdf_version = self.backend.version();

        for (page_num, page_id) in self.backend.pages() {
            let page = self.extract_page(page_num, page_id)?;
            log::debug!(
                "page {}: {} blocks, {} rule hits",
                page_num,
                page.blocks.len(),
                page.rule_hits
            );
            document.add_page(page);
        }

        Ok(document)
    }

    /// Walk a single page.
    pub fn extract_page(&self, page_num: u32, page_id: PageId) -> Result<Page> {
        let malformed = |e: Error| Error::MalformedContent {
            page: page_num,
            reason: e.to_string(),
        };

        let mut page = Page::new(page_num);

        let Some(content) = self.backend.page_content(page_id).map_err(malformed)? else {
            log::debug!("page {} has no content stream", page_num);
            return Ok(page);
        };

        let fonts: HashMap<Vec<u8>, String> = self
            .backend
            .page_fonts(page_id)
            .map_err(malformed)?
            .into_iter()
            .map(|f| (f.name, f.base_font))
            .collect();
        let images = self.backend.page_images(page_id).map_err(malformed)?;
        let ops = self.backend.decode_content(&content).map_err(malformed)?;

        let walk = ContentWalker {
            backend: self.backend,
            page_id,
            fonts: &fonts,
            images: &images,
        }
        .walk(&ops)
        .map_err(|reason| Error::MalformedContent {
            page: page_num,
            reason,
        })?;

        let lines = group_spans_into_lines(walk.spans);
        page.rule_hits = lines
            .iter()
            .map(|l| count_marker(&l.text(), &self.rule_marker))
            .sum();

        for block in group_lines_into_blocks(lines) {
            page.add_block(Block::Text(block));
        }
        for image in walk.images {
            page.add_block(Block::Image(image));
        }

        Ok(page)
    }
}

/// Spans and images collected from one content stream.
#[derive(Debug, Default)]
struct WalkOutput {
    spans: Vec<TextSpan>,
    images: Vec<ImageBlock>,
}

/// Interprets one page's operators.
struct ContentWalker<'p, B: PdfBackend> {
    backend: &'p B,
    page_id: PageId,
    fonts: &'p HashMap<Vec<u8>, String>,
    images: &'p BTreeSet<Vec<u8>>,
}

impl<'p, B: PdfBackend> ContentWalker<'p, B> {
    fn walk(&self, ops: &[ContentOp]) -> std::result::Result<WalkOutput, String> {
        let mut out = WalkOutput::default();
        let mut ctm = Matrix::IDENTITY;
        let mut ctm_stack: Vec<Matrix> = Vec::new();
        let mut text = TextState::default();
        let mut in_text_block = false;

        for op in ops {
            match op.operator.as_str() {
                "q" => ctm_stack.push(ctm),
                "Q" => match ctm_stack.pop() {
                    Some(saved) => ctm = saved,
                    None => log::debug!("unbalanced Q operator ignored"),
                },
                "cm" => {
                    if let Some(m) = matrix_operand(&op.operands) {
                        ctm = m.multiply(&ctm);
                    }
                }
                "BT" => {
                    in_text_block = true;
                    text.begin();
                }
                "ET" => in_text_block = false,
                "Tf" => {
                    let [PdfValue::Name(resource), size, ..] = op.operands.as_slice() else {
                        return Err("Tf needs a font name and a size".to_string());
                    };
                    text.font_size = get_number_from_value(size)
                        .ok_or_else(|| "Tf size must be a number".to_string())?;
                    text.font_name = match self.fonts.get(resource) {
                        Some(base_font) => base_font.clone(),
                        None => {
                            log::debug!(
                                "font resource /{} not in page resources",
                                String::from_utf8_lossy(resource)
                            );
                            UNKNOWN_FONT.to_string()
                        }
                    };
                    text.font_resource = Some(resource.clone());
                }
                "TL" => {
                    if let Some(leading) = op.operands.first().and_then(get_number_from_value) {
                        text.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    let (tx, ty) = pair_operand(&op.operands)
                        .ok_or_else(|| format!("{} needs two numbers", op.operator))?;
                    if op.operator == "TD" {
                        text.leading = -ty;
                    }
                    text.move_line(tx, ty);
                }
                "Tm" => {
                    let m = matrix_operand(&op.operands)
                        .ok_or_else(|| "Tm needs six numbers".to_string())?;
                    text.line_matrix = m;
                    text.matrix = m;
                }
                "T*" => text.next_line(),
                "Tj" | "'" | "\"" | "TJ" => {
                    if !in_text_block {
                        log::debug!("{} outside BT/ET ignored", op.operator);
                        continue;
                    }
                    if op.operator != "Tj" && op.operator != "TJ" {
                        text.next_line();
                    }
                    let span = self.show(op, &mut text, &ctm)?;
                    if let Some(span) = span {
                        out.spans.push(span);
                    }
                }
                "Do" => {
                    if let Some(PdfValue::Name(name)) = op.operands.first() {
                        if self.images.contains(name) {
                            out.images
                                .push(ImageBlock::xobject(String::from_utf8_lossy(name)));
                        }
                    }
                }
                "BI" => out.images.push(ImageBlock::inline()),
                _ => {}
            }
        }

        Ok(out)
    }

    /// Decode one text-showing operator into a span and advance the text matrix.
    fn show(
        &self,
        op: &ContentOp,
        text: &mut TextState,
        ctm: &Matrix,
    ) -> std::result::Result<Option<TextSpan>, String> {
        let font_resource = text
            .font_resource
            .clone()
            .ok_or_else(|| format!("{} before any Tf", op.operator))?;

        let decode = |bytes: &[u8]| self.backend.decode_text(self.page_id, &font_resource, bytes);

        let mut shown = String::new();
        let mut advance_units = 0.0f32;

        match op.operator.as_str() {
            "TJ" => {
                let Some(PdfValue::Array(items)) = op.operands.first() else {
                    return Err("TJ needs an array".to_string());
                };
                for item in items {
                    match item {
                        PdfValue::Str(bytes) => {
                            let decoded = decode(bytes);
                            advance_units += decoded.chars().count() as f32 * 500.0;
                            shown.push_str(&decoded);
                        }
                        other => {
                            if let Some(n) = get_number_from_value(other) {
                                advance_units -= n;
                                if -n > TJ_SPACE_THRESHOLD
                                    && !shown.is_empty()
                                    && !shown.ends_with(char::is_whitespace)
                                {
                                    shown.push(' ');
                                }
                            }
                        }
                    }
                }
            }
            operator => {
                let idx = if operator == "\"" { 2 } else { 0 };
                let Some(PdfValue::Str(bytes)) = op.operands.get(idx) else {
                    return Err(format!("{} needs a string operand", operator));
                };
                shown = decode(bytes);
                advance_units = shown.chars().count() as f32 * 500.0;
            }
        }

        let rendering = text.matrix.multiply(ctm);
        let effective_size = text.font_size * rendering.expansion();
        let (x, y) = (rendering.e, rendering.f);

        text.advance(advance_units / 1000.0 * text.font_size);

        // Whitespace-only spans are kept: their font and size still count.
        if shown.is_empty() {
            return Ok(None);
        }

        Ok(Some(
            TextSpan::new(shown, text.font_name.clone(), effective_size).at(x, y),
        ))
    }
}

/// Text state inside a `BT`/`ET` pair (font selection persists across blocks).
#[derive(Debug, Clone)]
struct TextState {
    matrix: Matrix,
    line_matrix: Matrix,
    font_resource: Option<Vec<u8>>,
    font_name: String,
    font_size: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font_resource: None,
            font_name: String::new(),
            font_size: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn begin(&mut self) {
        self.matrix = Matrix::IDENTITY;
        self.line_matrix = Matrix::IDENTITY;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translate(tx, ty).multiply(&self.line_matrix);
        self.matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    fn advance(&mut self, tx: f32) {
        self.matrix = Matrix::translate(tx, 0.0).multiply(&self.matrix);
    }
}

/// A PDF transformation matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translate(tx: f32, ty: f32) -> Self {
        Matrix {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    /// `self × other` in PDF row-vector convention.
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Uniform scale factor: square root of the determinant's magnitude.
    fn expansion(&self) -> f32 {
        (self.a * self.d - self.b * self.c).abs().sqrt()
    }
}

fn matrix_operand(operands: &[PdfValue]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let n: Vec<f32> = operands[..6]
        .iter()
        .map(get_number_from_value)
        .collect::<Option<_>>()?;
    Some(Matrix {
        a: n[0],
        b: n[1],
        c: n[2],
        d: n[3],
        e: n[4],
        f: n[5],
    })
}

fn pair_operand(operands: &[PdfValue]) -> Option<(f32, f32)> {
    match operands {
        [x, y, ..] => Some((get_number_from_value(x)?, get_number_from_value(y)?)),
        _ => None,
    }
}

/// Count non-overlapping occurrences of `marker` in `text`.
pub fn count_marker(text: &str, marker: &str) -> usize {
    if marker.is_empty() {
        return 0;
    }
    text.matches(marker).count()
}

/// Group spans into lines by baseline, top to bottom.
fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    if spans.is_empty() {
        return vec![];
    }

    // PDF Y grows upwards; stable sort keeps content order for ties.
    spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let y_tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= y_tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }

    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }

    lines
}

/// Group lines into blocks, breaking on large gaps and font-size jumps.
fn group_lines_into_blocks(lines: Vec<TextLine>) -> Vec<TextBlock> {
    if lines.is_empty() {
        return vec![];
    }

    let avg_spacing = average_line_spacing(&lines);
    let mut blocks = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            let spacing = (prev.y() - line.y()).abs();
            let size_jump = (prev.font_size() - line.font_size()).abs() > 1.0;
            if spacing > avg_spacing * 1.5 || size_jump {
                blocks.push(TextBlock::new(std::mem::take(&mut current)));
            }
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(TextBlock::new(current));
    }

    blocks
}

fn average_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y() - w[1].y()).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }

    spacings.iter().sum::<f32>() / spacings.len() as f32
}
