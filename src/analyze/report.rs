//! The analysis result handed back to callers.

use serde::{Deserialize, Serialize};

use super::{FormatMetrics, ScoreBreakdown};

/// Metrics, per-category points and the final score of one resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatReport {
    /// Measured metrics
    #[serde(flatten)]
    pub metrics: FormatMetrics,

    /// The six sub-scores in report order
    pub score_breakdown: ScoreBreakdown,

    /// Sum of the sub-scores, 0..=100
    pub final_resume_score: u8,
}

impl FormatReport {
    /// Score a set of metrics.
    pub fn new(metrics: FormatMetrics, max_file_size_mb: f64) -> Self {
        let score_breakdown = ScoreBreakdown::from_metrics(&metrics, max_file_size_mb);
        let final_resume_score = score_breakdown.total();
        Self {
            metrics,
            score_breakdown,
            final_resume_score,
        }
    }
}
