//! Rule-based format analysis of resume PDFs.
//!
//! [`FormatAnalyzer`] opens a PDF, walks it into the page model, measures
//! [`FormatMetrics`] and reduces them through fixed step tables into a
//! [`ScoreBreakdown`] that sums to a final score out of 100.
//!
//! ```no_run
//! use atscore::analyze::FormatAnalyzer;
//!
//! let report = FormatAnalyzer::new().analyze("resume.pdf")?;
//! println!("{}", report.final_resume_score);
//! # Ok::<(), atscore::Error>(())
//! ```

mod metrics;
mod report;
mod rules;
mod scoring;

pub use metrics::{
    contains_date, count_long_bullets, sizes_outside_range, FileInfo, FontObservation,
    FormatMetrics,
};
pub use report::FormatReport;
pub use rules::{FormatRules, STANDARD_FONTS};
pub use scoring::{ScoreBreakdown, ScoreCategory, SubScore};

use std::path::Path;

use crate::error::Result;
use crate::model::Document;
use crate::parser::{LayoutAnalyzer, LopdfBackend};

/// Format analyzer configured by a set of [`FormatRules`].
///
/// Holds no state between calls; one analyzer can score any number of files.
#[derive(Debug, Clone, Default)]
pub struct FormatAnalyzer {
    rules: FormatRules,
}

impl FormatAnalyzer {
    /// Analyzer with the stock rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzer with custom rules. Fails if the rules are contradictory.
    pub fn with_rules(rules: FormatRules) -> Result<Self> {
        rules.validate()?;
        Ok(Self { rules })
    }

    /// The rules in use.
    pub fn rules(&self) -> &FormatRules {
        &self.rules
    }

    /// Analyze a file on disk.
    ///
    /// A file that cannot be opened as a PDF fails with
    /// [`crate::Error::DocumentOpen`]; a page whose content stream cannot be
    /// walked fails with [`crate::Error::MalformedContent`]. No partial
    /// report is ever returned.
    pub fn analyze<P: AsRef<Path>>(&self, path: P) -> Result<FormatReport> {
        let path = path.as_ref();
        let file = FileInfo::from_path(path)?;
        let document = self.walk(path)?;
        log::debug!(
            "{}: {} pages, {} spans, {} images",
            path.display(),
            document.page_count(),
            document.spans().count(),
            document.image_count()
        );
        Ok(self.analyze_document(&document, file))
    }

    /// Analyze an already walked document.
    pub fn analyze_document(&self, document: &Document, file: FileInfo) -> FormatReport {
        let metrics = FormatMetrics::collect(document, &file, &self.rules);
        FormatReport::new(metrics, self.rules.max_file_size_mb)
    }

    /// Final score of a file on disk.
    pub fn score<P: AsRef<Path>>(&self, path: P) -> Result<u8> {
        Ok(self.analyze(path)?.final_resume_score)
    }

    /// Open and walk a file into the page model using these rules' marker.
    pub fn walk<P: AsRef<Path>>(&self, path: P) -> Result<Document> {
        let backend = LopdfBackend::load_file(path)?;
        LayoutAnalyzer::new(&backend)
            .with_rule_marker(self.rules.rule_marker.clone())
            .extract_document()
    }
}

/// Analyze a file with the stock rules.
pub fn analyze_file<P: AsRef<Path>>(path: P) -> Result<FormatReport> {
    FormatAnalyzer::new().analyze(path)
}

/// Final score of a file under the stock rules.
pub fn format_score<P: AsRef<Path>>(path: P) -> Result<u8> {
    FormatAnalyzer::new().score(path)
}
