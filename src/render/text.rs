//! Plain text rendering for format reports.

use std::fmt::Write;

use crate::analyze::FormatReport;
use crate::model::Document;

/// Render a report as human-readable text.
pub fn to_text(report: &FormatReport) -> String {
    let m = &report.metrics;
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "File Type: {}", display_or_none(&m.file_type));
    let _ = writeln!(out, "File Size: {:.2} MB", m.file_size_mb);
    let _ = writeln!(out, "Contains Dates: {}", yes_no(m.contains_dates));
    let _ = writeln!(out, "Long Bullet Points: {}", m.long_bullet_points_count);
    let _ = writeln!(out, "Standard Fonts Used: {}", join_or_none(&m.standard_fonts_used));
    let _ = writeln!(
        out,
        "Non-Standard Fonts Used: {}",
        join_or_none(&m.non_standard_fonts_used)
    );
    let sizes: Vec<String> = m.font_sizes_outside_range.iter().map(|s| s.to_string()).collect();
    let _ = writeln!(out, "Font Sizes Outside Range: {}", join_or_none(&sizes));
    let _ = writeln!(out, "Images: {}", m.images_in_pdf);
    let _ = writeln!(out, "Horizontal Lines: {}", m.horizontal_lines);

    out.push_str("\nScore Breakdown\n");
    for sub in report.score_breakdown.iter() {
        let _ = writeln!(out, "  {}: {}/{}", sub.category, sub.points, sub.max);
    }

    let _ = write!(out, "\nFinal Resume Score: {} / 100", report.final_resume_score);
    out
}

/// Plain text of a walked document, trimmed.
pub fn document_text(doc: &Document) -> String {
    doc.plain_text().trim().to_string()
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn display_or_none(value: &str) -> &str {
    if value.is_empty() {
        "none"
    } else {
        value
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
