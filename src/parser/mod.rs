//! PDF parsing module.

pub mod backend;
mod layout;

pub use backend::{BackendFontInfo, ContentOp, LopdfBackend, PageId, PdfBackend, PdfValue};
pub use layout::{count_marker, LayoutAnalyzer, DEFAULT_RULE_MARKER};
