//! Raw format metrics measured from a walked document.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

use regex::{RegexSet, RegexSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Document;

use super::FormatRules;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Month-year, numeric month/year, or any bare four-digit number.
const DATE_PATTERNS: [&str; 3] = [
    r"(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)[a-z]*[\s\-.,]*\d{4}",
    r"\d{2}/\d{4}",
    r"\d{4}",
];

/// Characters that open a bullet line.
const BULLET_MARKERS: [char; 3] = ['•', '-', '*'];

fn date_patterns() -> &'static RegexSet {
    static PATTERNS: OnceLock<RegexSet> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        RegexSetBuilder::new(DATE_PATTERNS)
            .case_insensitive(true)
            .build()
            .expect("date patterns are valid")
    })
}

/// File-level facts recorded before the document is walked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Extension including the leading dot (`".pdf"`), empty if none
    pub extension: String,
    /// Size in MiB rounded to two decimals
    pub size_mb: f64,
}

impl FileInfo {
    /// Build from an extension and a byte count.
    pub fn new(extension: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            extension: extension.into(),
            size_mb: round_to_hundredths(size_bytes as f64 / BYTES_PER_MIB),
        }
    }

    /// Read extension and size of a file on disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let size = std::fs::metadata(path)
            .map_err(|e| Error::document_open(path, e))?
            .len();
        Ok(Self::new(extension, size))
    }

    /// Whether the extension is `.pdf`, ignoring case.
    pub fn is_pdf_extension(&self) -> bool {
        self.extension.eq_ignore_ascii_case(".pdf")
    }
}

/// One (font name, font size) pair seen in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontObservation {
    /// Font name
    pub name: String,
    /// Effective size in points
    pub size: f32,
}

impl FontObservation {
    /// Create an observation.
    pub fn new(name: impl Into<String>, size: f32) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// Size rounded to whole points, halves to even.
    pub fn rounded_size(&self) -> i64 {
        f64::from(self.size).round_ties_even() as i64
    }
}

impl PartialEq for FontObservation {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FontObservation {}

impl PartialOrd for FontObservation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FontObservation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then(self.size.total_cmp(&other.size))
    }
}

/// The measured metrics of one resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatMetrics {
    /// File extension including the dot
    pub file_type: String,
    /// File size in MiB, two decimals
    pub file_size_mb: f64,
    /// At least one date-like pattern occurs in the text
    pub contains_dates: bool,
    /// Bullet lines longer than the word threshold
    pub long_bullet_points_count: usize,
    /// Allow-listed font names in use, sorted
    pub standard_fonts_used: Vec<String>,
    /// Font names in use that are not allow-listed, sorted
    pub non_standard_fonts_used: Vec<String>,
    /// Rounded sizes outside the range, one entry per distinct (font, size) pair
    pub font_sizes_outside_range: Vec<i64>,
    /// Image blocks across all pages
    pub images_in_pdf: usize,
    /// Horizontal-rule marker hits across all pages
    pub horizontal_lines: usize,
}

impl FormatMetrics {
    /// Measure a walked document.
    pub fn collect(document: &Document, file: &FileInfo, rules: &FormatRules) -> Self {
        let mut fonts = BTreeSet::new();
        let mut full_text = String::new();

        for span in document.spans() {
            fonts.insert(FontObservation::new(&span.font_name, span.font_size));
            full_text.push_str(&span.text);
            full_text.push(' ');
        }

        let used: BTreeSet<&str> = fonts.iter().map(|f| f.name.as_str()).collect();
        let (standard, non_standard): (Vec<&str>, Vec<&str>) =
            used.into_iter().partition(|name| rules.is_standard_font(name));

        Self {
            file_type: file.extension.clone(),
            file_size_mb: file.size_mb,
            contains_dates: contains_date(&full_text),
            long_bullet_points_count: count_long_bullets(&full_text, rules.long_bullet_words),
            standard_fonts_used: standard.into_iter().map(str::to_string).collect(),
            non_standard_fonts_used: non_standard.into_iter().map(str::to_string).collect(),
            font_sizes_outside_range: sizes_outside_range(&fonts, rules),
            images_in_pdf: document.image_count(),
            horizontal_lines: document.rule_hits(),
        }
    }
}

/// Whether any date-like pattern occurs in the text.
pub fn contains_date(text: &str) -> bool {
    date_patterns().is_match(text)
}

/// Count bullet lines with more than `max_words` whitespace-separated tokens.
pub fn count_long_bullets(text: &str, max_words: usize) -> usize {
    split_lines(text)
        .map(|line| line.trim_matches(is_separator))
        .filter(|line| line.starts_with(BULLET_MARKERS))
        .filter(|line| {
            line.split(is_separator)
                .filter(|word| !word.is_empty())
                .count()
                > max_words
        })
        .count()
}

/// Rounded sizes outside the acceptable range, one per observation.
pub fn sizes_outside_range(fonts: &BTreeSet<FontObservation>, rules: &FormatRules) -> Vec<i64> {
    fonts
        .iter()
        .map(FontObservation::rounded_size)
        .filter(|size| !rules.size_in_range(*size))
        .collect()
}

/// Split on every Unicode line boundary, `\r\n` included.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| {
        matches!(
            c,
            '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
        )
    })
}

/// Unicode whitespace plus the ASCII information separators `\x1c`..`\x1f`.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\x1c'..='\x1f').contains(&c)
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, ImageBlock, Page, TextBlock, TextLine, TextSpan};

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_date_patterns() {
        assert!(contains_date("Software Engineer, Jan 2023 - Present"));
        assert!(contains_date("september, 2021"));
        assert!(contains_date("SEPT.2020"));
        assert!(contains_date("05/2019"));
        assert!(contains_date("Class of 2019"));
        assert!(!contains_date("Jane Doe, jane@example.com, 555-010"));
        assert!(!contains_date(""));
    }

    #[test]
    fn test_long_bullets() {
        let text = format!(
            "• {}\n- {}\n  * {}\n{}\n• {}",
            words(21),
            words(25),
            words(30),
            words(40),
            words(19)
        );
        // "• " plus 19 words is exactly 20 tokens, which is not long.
        assert_eq!(count_long_bullets(&text, 20), 3);
    }

    #[test]
    fn test_long_bullets_all_line_breaks() {
        let long = format!("- {}", words(21));
        let text = format!("{long}\r\n{long}\u{2028}{long}\x0c{long}");
        assert_eq!(count_long_bullets(&text, 20), 4);
    }

    #[test]
    fn test_unit_separator_splits_words() {
        let text = format!("\x1f- {}\x1f{}", words(10), words(11));
        assert_eq!(count_long_bullets(&text, 20), 1);
        assert_eq!(count_long_bullets(&text, 22), 0);
    }

    #[test]
    fn test_single_line_buffer_only_counts_leading_bullet() {
        let text = format!("Summary {} • {} ", words(30), words(30));
        assert_eq!(count_long_bullets(&text, 20), 0);
    }

    #[test]
    fn test_rounded_size_halves_to_even() {
        assert_eq!(FontObservation::new("Arial", 10.5).rounded_size(), 10);
        assert_eq!(FontObservation::new("Arial", 11.5).rounded_size(), 12);
        assert_eq!(FontObservation::new("Arial", 12.5).rounded_size(), 12);
        assert_eq!(FontObservation::new("Arial", 9.5).rounded_size(), 10);
        assert_eq!(FontObservation::new("Arial", 12.51).rounded_size(), 13);
    }

    #[test]
    fn test_sizes_outside_range_keeps_duplicates_per_pair() {
        let fonts: BTreeSet<_> = [
            FontObservation::new("Arial", 14.0),
            FontObservation::new("Lato", 14.0),
            FontObservation::new("Arial", 14.0),
            FontObservation::new("Arial", 8.2),
            FontObservation::new("Arial", 11.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(fonts.len(), 4);
        assert_eq!(
            sizes_outside_range(&fonts, &FormatRules::default()),
            vec![8, 14, 14]
        );
    }

    #[test]
    fn test_file_info() {
        let info = FileInfo::new(".PDF", 512 * 1024);
        assert!(info.is_pdf_extension());
        assert_eq!(info.size_mb, 0.5);

        let info = FileInfo::new(".docx", 2 * 1024 * 1024 + 10_000);
        assert!(!info.is_pdf_extension());
        assert_eq!(info.size_mb, 2.01);

        assert_eq!(FileInfo::new("", 0).size_mb, 0.0);
    }

    #[test]
    fn test_collect_metrics() {
        let mut page = Page::new(1);
        page.add_block(Block::Text(TextBlock::new(vec![
            TextLine::from_spans(vec![TextSpan::new("Jane Doe", "Calibri", 14.0)]),
            TextLine::from_spans(vec![TextSpan::new("Mar 2021", "ComicSans", 11.0)]),
            TextLine::from_spans(vec![TextSpan::new("Rust", "Calibri", 11.0)]),
        ])));
        page.add_block(Block::Image(ImageBlock::xobject("Im1")));
        page.rule_hits = 2;
        let mut second = Page::new(2);
        second.add_block(Block::Text(TextBlock::new(vec![TextLine::from_spans(vec![
            TextSpan::new("________________", "Calibri", 11.0),
        ])])));
        second.add_block(Block::Image(ImageBlock::inline()));
        second.rule_hits = 2;
        let mut doc = Document::new();
        doc.add_page(page);
        doc.add_page(second);

        let metrics = FormatMetrics::collect(
            &doc,
            &FileInfo::new(".pdf", 1024),
            &FormatRules::default(),
        );

        assert_eq!(metrics.file_type, ".pdf");
        assert!(metrics.contains_dates);
        assert_eq!(metrics.long_bullet_points_count, 0);
        assert_eq!(metrics.standard_fonts_used, vec!["Calibri"]);
        assert_eq!(metrics.non_standard_fonts_used, vec!["ComicSans"]);
        assert_eq!(metrics.font_sizes_outside_range, vec![14]);
        assert_eq!(metrics.images_in_pdf, 2);
        assert_eq!(metrics.horizontal_lines, 4);
    }
}
