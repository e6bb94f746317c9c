//! Sub-score step tables.
//!
//! Every table is total over its input, so scoring cannot fail once the
//! metrics exist. The six maxima sum to exactly 100.

use serde::{Deserialize, Serialize};

use super::FormatMetrics;

/// One of the six independently capped score components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreCategory {
    #[serde(rename = "File Type/Size")]
    FileTypeSize,
    #[serde(rename = "Dates Present")]
    DatesPresent,
    #[serde(rename = "Bullet Point Length")]
    BulletPointLength,
    #[serde(rename = "Font Standards")]
    FontStandards,
    #[serde(rename = "Font Size Range")]
    FontSizeRange,
    #[serde(rename = "Design Cleanliness")]
    DesignCleanliness,
}

impl ScoreCategory {
    /// All categories in report order.
    pub const ALL: [ScoreCategory; 6] = [
        ScoreCategory::FileTypeSize,
        ScoreCategory::DatesPresent,
        ScoreCategory::BulletPointLength,
        ScoreCategory::FontStandards,
        ScoreCategory::FontSizeRange,
        ScoreCategory::DesignCleanliness,
    ];

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            ScoreCategory::FileTypeSize => "File Type/Size",
            ScoreCategory::DatesPresent => "Dates Present",
            ScoreCategory::BulletPointLength => "Bullet Point Length",
            ScoreCategory::FontStandards => "Font Standards",
            ScoreCategory::FontSizeRange => "Font Size Range",
            ScoreCategory::DesignCleanliness => "Design Cleanliness",
        }
    }

    /// Cap for this category.
    pub fn max(self) -> u8 {
        match self {
            ScoreCategory::FileTypeSize => 15,
            ScoreCategory::DatesPresent => 15,
            ScoreCategory::BulletPointLength => 20,
            ScoreCategory::FontStandards => 25,
            ScoreCategory::FontSizeRange => 15,
            ScoreCategory::DesignCleanliness => 10,
        }
    }
}

impl std::fmt::Display for ScoreCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Points earned in one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubScore {
    pub category: ScoreCategory,
    pub points: u8,
    pub max: u8,
}

impl SubScore {
    fn new(category: ScoreCategory, points: u8) -> Self {
        Self {
            category,
            points: points.min(category.max()),
            max: category.max(),
        }
    }
}

/// The six sub-scores in fixed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreBreakdown {
    entries: Vec<SubScore>,
}

impl ScoreBreakdown {
    /// Score measured metrics.
    pub fn from_metrics(metrics: &FormatMetrics, max_file_size_mb: f64) -> Self {
        let entries = ScoreCategory::ALL
            .iter()
            .map(|&category| {
                let points = match category {
                    ScoreCategory::FileTypeSize => file_type_size_points(
                        &metrics.file_type,
                        metrics.file_size_mb,
                        max_file_size_mb,
                    ),
                    ScoreCategory::DatesPresent => dates_points(metrics.contains_dates),
                    ScoreCategory::BulletPointLength => {
                        bullet_length_points(metrics.long_bullet_points_count)
                    }
                    ScoreCategory::FontStandards => {
                        font_standards_points(metrics.non_standard_fonts_used.len())
                    }
                    ScoreCategory::FontSizeRange => {
                        font_size_points(metrics.font_sizes_outside_range.len())
                    }
                    ScoreCategory::DesignCleanliness => {
                        design_points(metrics.images_in_pdf, metrics.horizontal_lines)
                    }
                };
                SubScore::new(category, points)
            })
            .collect();

        Self { entries }
    }

    /// Sum of the sub-scores (0..=100).
    pub fn total(&self) -> u8 {
        self.entries.iter().map(|s| s.points).sum()
    }

    /// Points for one category.
    pub fn points(&self, category: ScoreCategory) -> u8 {
        self.entries
            .iter()
            .find(|s| s.category == category)
            .map(|s| s.points)
            .unwrap_or(0)
    }

    /// Iterate in report order.
    pub fn iter(&self) -> impl Iterator<Item = &SubScore> {
        self.entries.iter()
    }
}

/// +8 for a `.pdf` extension (any case), +7 within the size limit else +5.
pub fn file_type_size_points(extension: &str, size_mb: f64, max_size_mb: f64) -> u8 {
    let type_points = if extension.eq_ignore_ascii_case(".pdf") {
        8
    } else {
        0
    };
    let size_points = if size_mb <= max_size_mb { 7 } else { 5 };
    type_points + size_points
}

pub fn dates_points(contains_dates: bool) -> u8 {
    if contains_dates {
        15
    } else {
        0
    }
}

pub fn bullet_length_points(long_bullets: usize) -> u8 {
    match long_bullets {
        0..=2 => 20,
        3..=5 => 10,
        _ => 5,
    }
}

pub fn font_standards_points(non_standard_fonts: usize) -> u8 {
    match non_standard_fonts {
        0 => 25,
        1..=2 => 10,
        _ => 0,
    }
}

pub fn font_size_points(invalid_sizes: usize) -> u8 {
    match invalid_sizes {
        0 => 15,
        1..=2 => 7,
        _ => 0,
    }
}

pub fn design_points(images: usize, horizontal_lines: usize) -> u8 {
    if images <= 2 && horizontal_lines <= 3 {
        10
    } else {
        5
    }
}
