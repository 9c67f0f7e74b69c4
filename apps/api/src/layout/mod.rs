// Document layout: measures resume content and places it on fixed-size pages.
// Pure and synchronous. Callers on the async runtime must wrap it in
// tokio::task::spawn_blocking.

pub mod cursor;
pub mod dates;
pub mod document;
pub mod engine;
pub mod font_metrics;
pub mod template;

use thiserror::Error;

// Re-export the public API consumed by the exporter and handlers.
pub use document::{DrawOp, LaidOutDocument, Page, PageGeometry};
pub use engine::layout_resume;
pub use font_metrics::{FontFace, StandardFontMeasurer, TextMeasurer};
pub use template::{Rgb, TemplateId, TemplateStyle};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("character {ch:?} cannot be rendered with the standard PDF fonts")]
    UnsupportedGlyph { ch: char },
}
