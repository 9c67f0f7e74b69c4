//! Running position for one layout pass.

use tracing::trace;

use crate::layout::document::PageGeometry;

/// Where the cursor is in its two-state cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Accumulating content on the current page.
    Drawing,
    /// A page was just flushed; the cursor sits at the top margin of a fresh page.
    PageBreak,
}

/// Transient vertical offset and page index. Created per render call, never persisted.
///
/// `y` is the top of the next line box, in millimeters from the page top.
#[derive(Debug, Clone)]
pub struct LayoutCursor {
    geometry: PageGeometry,
    y: f32,
    page_index: usize,
    state: CursorState,
}

impl LayoutCursor {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            y: geometry.margin,
            page_index: 0,
            state: CursorState::Drawing,
        }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// True when nothing has been drawn on the current page yet.
    pub fn at_page_top(&self) -> bool {
        self.y <= self.geometry.margin
    }

    pub fn remaining(&self) -> f32 {
        self.geometry.content_bottom() - self.y
    }

    /// Whether a block of `height` fits below the cursor on this page.
    pub fn fits(&self, height: f32) -> bool {
        // Tolerate float noise from summing many line advances.
        height <= self.remaining() + 1e-3
    }

    pub fn advance(&mut self, dy: f32) {
        self.y += dy;
        self.state = CursorState::Drawing;
    }

    /// Flushes the current page and resets to the top margin of the next one.
    pub fn break_page(&mut self) {
        trace!(from_page = self.page_index, y = self.y, "page break");
        self.page_index += 1;
        self.y = self.geometry.margin;
        self.state = CursorState::PageBreak;
    }
}
