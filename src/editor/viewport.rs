//! Scroll position of an editing surface.
//!
//! The [`Viewport`] tracks which lines of a buffer are on screen and
//! handles scroll-into-view requests.

use std::ops::Range;

/// Manages the visible portion of a buffer.
///
/// # Example
///
/// ```
/// use taskreveal::editor::Viewport;
///
/// let mut vp = Viewport::new(24, 100);
/// assert_eq!(vp.visible_range(), 0..24);
///
/// vp.scroll_into_view(50..51);
/// assert!(vp.visible_range().contains(&50));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    height: u16,
    offset: usize,
    total_lines: usize,
}

impl Viewport {
    /// Create a viewport showing `height` lines of a `total_lines` buffer.
    pub const fn new(height: u16, total_lines: usize) -> Self {
        Self {
            height,
            offset: 0,
            total_lines,
        }
    }

    /// Get the current scroll offset.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Get the range of visible lines, clamped to the buffer.
    pub fn visible_range(&self) -> Range<usize> {
        let start = self.offset;
        let end = (self.offset + self.height as usize).min(self.total_lines);
        start..end
    }

    /// Put a line at the top of the viewport.
    pub fn go_to_line(&mut self, line: usize) {
        self.offset = line.min(self.max_offset());
    }

    /// Scroll the minimum needed so `lines` is on screen, centering it when
    /// it was off screen.
    ///
    /// A range already fully visible leaves the offset untouched.
    pub fn scroll_into_view(&mut self, lines: Range<usize>) {
        let visible = self.visible_range();
        if lines.start >= visible.start && lines.end <= visible.end {
            return;
        }
        let span = lines.end.saturating_sub(lines.start);
        let margin = (self.height as usize).saturating_sub(span) / 2;
        self.go_to_line(lines.start.saturating_sub(margin));
    }

    /// Update the total number of lines (e.g., after an edit).
    pub fn set_total_lines(&mut self, total: usize) {
        self.total_lines = total;
        self.offset = self.offset.min(self.max_offset());
    }

    const fn max_offset(&self) -> usize {
        self.total_lines.saturating_sub(self.height as usize)
    }
}
