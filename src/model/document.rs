//! Document-level types.

use super::{Page, TextSpan};
use serde::{Deserialize, Serialize};

/// The walked content of a PDF document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// PDF version from the header
    pub pdf_version: String,

    /// Pages in the document
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&Page> {
        if page_num == 0 {
            return None;
        }
        self.pages.get((page_num - 1) as usize)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Iterate over every span in the document.
    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.pages.iter().flat_map(Page::spans)
    }

    /// Total image blocks across all pages.
    pub fn image_count(&self) -> usize {
        self.pages.iter().map(Page::image_count).sum()
    }

    /// Total horizontal-rule marker hits across all pages.
    pub fn rule_hits(&self) -> usize {
        self.pages.iter().map(|p| p.rule_hits).sum()
    }

    /// Plain text of the whole document: lines joined by newlines, pages
    /// joined by a newline.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(Page::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
