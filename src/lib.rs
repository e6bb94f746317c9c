//! # atscore
//!
//! ATS-style resume scoring for PDF files.
//!
//! The core is a deterministic format analyzer: it walks a PDF's content
//! streams, measures fonts, sizes, images, horizontal rules, bullet lengths
//! and date patterns, and reduces them into six capped sub-scores that sum
//! to a score out of 100. With the `llm` feature (on by default) the format
//! score can be folded into a model-graded ATS score.
//!
//! ## Quick Start
//!
//! ```no_run
//! use atscore::{analyze_file, render};
//!
//! fn main() -> atscore::Result<()> {
//!     let report = analyze_file("resume.pdf")?;
//!     println!("{}", render::to_text(&report));
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Format analysis**: fonts, sizes, images, rules, bullets and dates
//! - **Configurable rules**: allow-list, size range and limits via [`FormatRules`]
//! - **Text extraction**: block/line/span page model, plain text output
//! - **Model grading** (`llm`): Gemini client behind a swappable trait

pub mod analyze;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

#[cfg(feature = "llm")]
pub mod llm;

// Re-export commonly used types
pub use analyze::{
    analyze_file, format_score, FileInfo, FormatAnalyzer, FormatMetrics, FormatReport,
    FormatRules, ScoreBreakdown, ScoreCategory, SubScore,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use model::{Block, Document, ImageBlock, Page, TextBlock, TextLine, TextSpan};
pub use parser::{LayoutAnalyzer, LopdfBackend, PdfBackend};
pub use render::JsonFormat;

use std::io::Read;
use std::path::Path;

/// Parse a PDF file into the page model.
///
/// # Example
///
/// ```no_run
/// use atscore::parse_file;
///
/// let doc = parse_file("resume.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let backend = LopdfBackend::load_file(path)?;
    LayoutAnalyzer::new(&backend).extract_document()
}

/// Parse a PDF from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    let backend = LopdfBackend::load_bytes(data)?;
    LayoutAnalyzer::new(&backend).extract_document()
}

/// Parse a PDF from a reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    let backend = LopdfBackend::load_reader(reader)?;
    LayoutAnalyzer::new(&backend).extract_document()
}

/// Extract plain text from a PDF file: one line per text line, trimmed.
///
/// # Example
///
/// ```no_run
/// use atscore::extract_text;
///
/// let text = extract_text("resume.pdf").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file(path)?;
    Ok(render::document_text(&doc))
}

/// Analyze a file and render the report as JSON.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let report = analyze_file(path)?;
    render::to_json(&report, format)
}

/// Analyze a file and render the report as text.
pub fn to_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let report = analyze_file(path)?;
    Ok(render::to_text(&report))
}
