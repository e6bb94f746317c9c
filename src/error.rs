//! Error types for the atscore library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for atscore operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while analyzing or evaluating a resume.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file could not be opened as a PDF document.
    #[error("Cannot open {} as a PDF document: {reason}", path.display())]
    DocumentOpen {
        /// Path that was being opened
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// A page's content could not be decomposed into blocks, lines and spans.
    #[error("Malformed content stream on page {page}: {reason}")]
    MalformedContent {
        /// Page number (1-indexed)
        page: u32,
        /// What went wrong
        reason: String,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Error during rendering (text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level HTTP failure talking to the generative model.
    #[cfg(feature = "llm")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The generative model API answered with a non-success status.
    #[error("Model API error (status {status}): {message}")]
    ModelApi {
        /// HTTP status code
        status: u16,
        /// Error message returned by the API
        message: String,
    },

    /// The generative model answered, but not with what was asked for.
    #[error("Unusable model reply: {0}")]
    ModelReply(String),
}

impl Error {
    /// Wrap any failure of the open step into a [`Error::DocumentOpen`].
    pub fn document_open(path: impl Into<PathBuf>, cause: impl std::fmt::Display) -> Self {
        Error::DocumentOpen {
            path: path.into(),
            reason: cause.to_string(),
        }
    }

    /// Whether this error came from opening the document.
    pub fn is_open_error(&self) -> bool {
        matches!(self, Error::DocumentOpen { .. })
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
