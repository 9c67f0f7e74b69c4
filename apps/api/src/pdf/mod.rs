// PDF encoding of laid-out documents.
// Uses the base-14 Helvetica family with WinAnsiEncoding, so no font files are embedded.

pub mod content;
pub mod writer;

use std::io;

use thiserror::Error;

pub use writer::write_document;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("character {ch:?} cannot be encoded in WinAnsiEncoding")]
    UnsupportedGlyph { ch: char },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Encoding switches for one export.
#[derive(Debug, Clone)]
pub struct PdfOptions {
    /// Flate-compress page content streams.
    pub compress: bool,
    /// Written to the document info dictionary.
    pub title: Option<String>,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            compress: true,
            title: None,
        }
    }
}
