//! Format rule configuration.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::parser::DEFAULT_RULE_MARKER;

/// Font family names treated as ATS-safe. Matching is exact and case-sensitive.
pub const STANDARD_FONTS: [&str; 12] = [
    "Times-Roman",
    "Times New Roman",
    "Helvetica",
    "Arial",
    "Calibri",
    "Cambria",
    "Georgia",
    "Garamond",
    "Verdana",
    "Roboto",
    "Lato",
    "Open Sans",
];

/// Thresholds and lists the format metrics are measured against.
///
/// The defaults reproduce the stock rubric; the score step tables themselves
/// are fixed (see [`crate::analyze::ScoreBreakdown`]).
#[derive(Debug, Clone, PartialEq)]
pub struct FormatRules {
    /// Literal text counted as a horizontal rule
    pub rule_marker: String,

    /// Allow-list of standard font names
    pub standard_fonts: BTreeSet<String>,

    /// A bullet line with more words than this is "long"
    pub long_bullet_words: usize,

    /// Smallest acceptable rounded font size (inclusive)
    pub min_font_size: i64,

    /// Largest acceptable rounded font size (inclusive)
    pub max_font_size: i64,

    /// Largest file size, in MiB, that still earns the full size points
    pub max_file_size_mb: f64,
}

impl FormatRules {
    /// Create rules with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the horizontal-rule marker.
    pub fn with_rule_marker(mut self, marker: impl Into<String>) -> Self {
        self.rule_marker = marker.into();
        self
    }

    /// Replace the standard font allow-list.
    pub fn with_standard_fonts<I, S>(mut self, fonts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.standard_fonts = fonts.into_iter().map(Into::into).collect();
        self
    }

    /// Add one font name to the allow-list.
    pub fn allow_font(mut self, font: impl Into<String>) -> Self {
        self.standard_fonts.insert(font.into());
        self
    }

    /// Set the long-bullet word threshold.
    pub fn with_long_bullet_words(mut self, words: usize) -> Self {
        self.long_bullet_words = words;
        self
    }

    /// Set the acceptable font size range (inclusive, whole points).
    pub fn with_font_size_range(mut self, min: i64, max: i64) -> Self {
        self.min_font_size = min;
        self.max_font_size = max;
        self
    }

    /// Set the file size limit in MiB.
    pub fn with_max_file_size_mb(mut self, mb: f64) -> Self {
        self.max_file_size_mb = mb;
        self
    }

    /// Whether a rounded font size lies inside the acceptable range.
    pub fn size_in_range(&self, size: i64) -> bool {
        (self.min_font_size..=self.max_font_size).contains(&size)
    }

    /// Whether a font name is on the allow-list.
    pub fn is_standard_font(&self, name: &str) -> bool {
        self.standard_fonts.contains(name)
    }

    /// Check the rules for contradictions.
    pub fn validate(&self) -> Result<()> {
        if self.rule_marker.is_empty() {
            return Err(Error::Config("rule marker must not be empty".to_string()));
        }
        if self.min_font_size > self.max_font_size {
            return Err(Error::Config(format!(
                "font size range {}..={} is empty",
                self.min_font_size, self.max_font_size
            )));
        }
        if !self.max_file_size_mb.is_finite() || self.max_file_size_mb < 0.0 {
            return Err(Error::Config(format!(
                "file size limit {} MiB is not a usable number",
                self.max_file_size_mb
            )));
        }
        Ok(())
    }
}

impl Default for FormatRules {
    fn default() -> Self {
        Self {
            rule_marker: DEFAULT_RULE_MARKER.to_string(),
            standard_fonts: STANDARD_FONTS.iter().map(|f| f.to_string()).collect(),
            long_bullet_words: 20,
            min_font_size: 10,
            max_font_size: 12,
            max_file_size_mb: 2.0,
        }
    }
}
