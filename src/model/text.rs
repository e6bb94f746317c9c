//! Text runs: spans, lines and blocks.

use serde::{Deserialize, Serialize};

/// A run of text sharing one font and size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// Font name as reported by the font dictionary (subset tag removed)
    pub font_name: String,
    /// Effective font size in points
    pub font_size: f32,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Estimated advance width
    pub width: f32,
}

impl TextSpan {
    /// Create a new text span. The width is estimated at half an em per character.
    pub fn new(text: impl Into<String>, font_name: impl Into<String>, font_size: f32) -> Self {
        let text = text.into();
        let width = text.chars().count() as f32 * font_size * 0.5;
        Self {
            text,
            font_name: font_name.into(),
            font_size,
            x: 0.0,
            y: 0.0,
            width,
        }
    }

    /// Place the span at a position.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}

/// A text line composed of spans on the same baseline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
}

impl TextLine {
    /// Create a line from spans, ordering them left to right.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.total_cmp(&b.x));
        Self { spans }
    }

    /// Baseline of the line (first span's baseline).
    pub fn y(&self) -> f32 {
        self.spans.first().map(|s| s.y).unwrap_or(0.0)
    }

    /// Left edge of the line.
    pub fn x(&self) -> f32 {
        self.spans.first().map(|s| s.x).unwrap_or(0.0)
    }

    /// Dominant font size, weighted by text length.
    pub fn font_size(&self) -> f32 {
        let total_chars: usize = self.spans.iter().map(|s| s.text.len()).sum();
        if total_chars == 0 {
            return self.spans.first().map(|s| s.font_size).unwrap_or(0.0);
        }
        let weighted: f32 = self
            .spans
            .iter()
            .map(|s| s.font_size * s.text.len() as f32)
            .sum();
        weighted / total_chars as f32
    }

    /// Combined text of all spans.
    ///
    /// A space is inserted between spans when the horizontal gap exceeds 20%
    /// of the current span's average character width and neither side
    /// already carries whitespace.
    pub fn text(&self) -> String {
        let mut result = String::new();

        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                let prev = &self.spans[i - 1];
                let gap = span.x - (prev.x + prev.width);
                let char_count = span.text.chars().count();
                let avg_char_width = if char_count > 0 && span.width > 0.0 {
                    span.width / char_count as f32
                } else {
                    span.font_size * 0.5
                };

                let prev_ends_with_space = prev.text.ends_with(char::is_whitespace);
                let curr_starts_with_space = span.text.starts_with(char::is_whitespace);
                if gap > avg_char_width * 0.2 && !prev_ends_with_space && !curr_starts_with_space
                {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
        }

        result
    }
}

/// A block of consecutive lines (paragraph-like).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// The lines in this block, top to bottom
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    /// Create a block from lines.
    pub fn new(lines: Vec<TextLine>) -> Self {
        Self { lines }
    }

    /// Lines joined with newlines; whitespace-only lines are skipped.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(TextLine::text)
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Iterate over every span in the block.
    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.lines.iter().flat_map(|l| l.spans.iter())
    }

    /// Check if the block is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() || self.text().trim().is_empty()
    }
}
