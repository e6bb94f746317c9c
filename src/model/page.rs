//! Page-level types.

use super::{TextBlock, TextSpan};
use serde::{Deserialize, Serialize};

/// A single page in the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Content blocks in reading order
    pub blocks: Vec<Block>,

    /// Occurrences of the horizontal-rule marker found in this page's text
    pub rule_hits: usize,
}

impl Page {
    /// Create an empty page.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            blocks: Vec::new(),
            rule_hits: 0,
        }
    }

    /// Add a block to the page.
    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Iterate over the text blocks.
    pub fn text_blocks(&self) -> impl Iterator<Item = &TextBlock> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Text(t) => Some(t),
            Block::Image(_) => None,
        })
    }

    /// Iterate over every span on the page, block by block.
    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.text_blocks().flat_map(TextBlock::spans)
    }

    /// Number of image blocks on the page.
    pub fn image_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_image()).count()
    }

    /// Plain text of the page, one line per text line.
    pub fn plain_text(&self) -> String {
        self.text_blocks()
            .map(TextBlock::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if the page has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// A content block on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Lines of text
    Text(TextBlock),

    /// A placed image (counted, never decoded)
    Image(ImageBlock),
}

impl Block {
    /// Check if this block is an image.
    pub fn is_image(&self) -> bool {
        matches!(self, Block::Image(_))
    }
}

/// An image drawn on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    /// XObject resource name, or `None` for inline images
    pub name: Option<String>,
}

impl ImageBlock {
    /// An image placed through an XObject resource.
    pub fn xobject(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// An inline (`BI`..`EI`) image.
    pub fn inline() -> Self {
        Self { name: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextLine;

    #[test]
    fn test_page_counts() {
        let mut page = Page::new(1);
        assert!(page.is_empty());

        page.add_block(Block::Text(TextBlock::new(vec![TextLine::from_spans(
            vec![TextSpan::new("Jane Doe", "Helvetica", 11.0)],
        )])));
        page.add_block(Block::Image(ImageBlock::xobject("Im1")));
        page.add_block(Block::Image(ImageBlock::inline()));

        assert_eq!(page.image_count(), 2);
        assert_eq!(page.spans().count(), 1);
        assert_eq!(page.plain_text(), "Jane Doe");
    }
}
