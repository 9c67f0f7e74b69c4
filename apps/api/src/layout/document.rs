//! The layout engine's output: pages of positioned draw primitives.
//!
//! Coordinates are millimeters from the top-left corner of the page. Text `y`
//! is the baseline; text `x` is the left edge (right-aligned runs are already
//! resolved to a left edge during layout).

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::FontFace;
use crate::layout::template::Rgb;

/// Physical page size and margins, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    /// A4 portrait with 20mm margins.
    pub const fn a4() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin: 20.0,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Lowest y a content line box may reach.
    pub fn content_bottom(&self) -> f32 {
        self.height - self.margin
    }

    /// Vertical space available for content on one page.
    pub fn content_height(&self) -> f32 {
        self.content_bottom() - self.margin
    }

    pub fn right_edge(&self) -> f32 {
        self.width - self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// A single positioned primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        text: String,
        face: FontFace,
        size_pt: f32,
        color: Rgb,
    },
    Rule {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        thickness: f32,
        color: Rgb,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-indexed position in the document.
    pub number: usize,
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            ops: Vec::new(),
        }
    }

    /// All text runs on the page, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::Rule { .. } => None,
        })
    }
}

/// A completed, page-numbered document ready for encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaidOutDocument {
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

impl LaidOutDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
