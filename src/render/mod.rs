//! Rendering of format reports and extracted text.

mod json;
mod text;

pub use json::{to_json, JsonFormat};
pub use text::{document_text, to_text};
