//! Page model produced by the content-stream walk.
//!
//! A document is an ordered list of pages; each page yields text blocks
//! (lines of spans) and image blocks. The analyzer only ever reads this
//! model, so it can be built by hand in tests.

mod document;
mod page;
mod text;

pub use document::Document;
pub use page::{Block, ImageBlock, Page};
pub use text::{TextBlock, TextLine, TextSpan};
