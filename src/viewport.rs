//! Scroll container state for row-based lists.
//!
//! The viewport tracks a vertical window of `height` rows over `content_len`
//! rows. It does not own or render the rows; components such as
//! [`crate::select::Model`] ask it for [`Model::visible_range`] and slice their
//! own data. [`crate::sentinel::ViewportSentinel`] uses the same window to
//! decide when the last row is close to coming into view.
//!
//! ```rust
//! use datagrid_widgets::viewport::Model;
//!
//! let mut viewport = Model::new(5);
//! viewport.set_content_len(12);
//! assert_eq!(viewport.visible_range(), 0..5);
//!
//! viewport.page_down();
//! assert_eq!(viewport.visible_range(), 5..10);
//!
//! viewport.goto_bottom();
//! assert!(viewport.at_bottom());
//! assert_eq!(viewport.visible_range(), 7..12);
//! ```

use std::ops::Range;

/// A vertical scroll window measured in rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    /// Number of rows visible at once.
    pub height: usize,
    /// Rows scrolled per mouse wheel notch.
    pub mouse_wheel_delta: usize,
    y_offset: usize,
    content_len: usize,
}

impl Default for Model {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Model {
    /// Creates an empty viewport showing `height` rows.
    pub fn new(height: usize) -> Self {
        Self {
            height,
            mouse_wheel_delta: 3,
            y_offset: 0,
            content_len: 0,
        }
    }

    /// Number of rows scrolled past the top.
    pub fn y_offset(&self) -> usize {
        self.y_offset
    }

    /// Number of rows in the content.
    pub fn content_len(&self) -> usize {
        self.content_len
    }

    /// Updates the content length, keeping the offset in range.
    ///
    /// Appending rows never moves the window, so the user keeps their place
    /// while more items stream in.
    pub fn set_content_len(&mut self, len: usize) {
        self.content_len = len;
        self.y_offset = self.y_offset.min(self.max_y_offset());
    }

    /// Changes the visible height, keeping the offset in range.
    pub fn set_height(&mut self, height: usize) {
        self.height = height;
        self.y_offset = self.y_offset.min(self.max_y_offset());
    }

    /// Largest valid offset.
    pub fn max_y_offset(&self) -> usize {
        self.content_len.saturating_sub(self.height)
    }

    /// Scrolls to `n`, clamped to the valid range.
    pub fn set_y_offset(&mut self, n: usize) {
        self.y_offset = n.min(self.max_y_offset());
    }

    /// True when scrolled to the top.
    pub fn at_top(&self) -> bool {
        self.y_offset == 0
    }

    /// True when the last row is visible.
    pub fn at_bottom(&self) -> bool {
        self.y_offset >= self.max_y_offset()
    }

    /// Vertical position as a fraction from 0.0 (top) to 1.0 (bottom).
    pub fn scroll_percent(&self) -> f64 {
        let max = self.max_y_offset();
        if max == 0 {
            return 1.0;
        }
        (self.y_offset as f64 / max as f64).clamp(0.0, 1.0)
    }

    /// Indices of the rows currently inside the window.
    pub fn visible_range(&self) -> Range<usize> {
        let start = self.y_offset.min(self.content_len);
        let end = (start + self.height).min(self.content_len);
        start..end
    }

    /// Scrolls down `n` rows.
    pub fn scroll_down(&mut self, n: usize) {
        self.set_y_offset(self.y_offset.saturating_add(n));
    }

    /// Scrolls up `n` rows.
    pub fn scroll_up(&mut self, n: usize) {
        self.y_offset = self.y_offset.saturating_sub(n);
    }

    /// Scrolls down by one mouse wheel step.
    pub fn wheel_down(&mut self) {
        self.scroll_down(self.mouse_wheel_delta);
    }

    /// Scrolls up by one mouse wheel step.
    pub fn wheel_up(&mut self) {
        self.scroll_up(self.mouse_wheel_delta);
    }

    /// Scrolls down one full window.
    pub fn page_down(&mut self) {
        self.scroll_down(self.height.max(1));
    }

    /// Scrolls up one full window.
    pub fn page_up(&mut self) {
        self.scroll_up(self.height.max(1));
    }

    /// Scrolls down half a window.
    pub fn half_page_down(&mut self) {
        self.scroll_down((self.height / 2).max(1));
    }

    /// Scrolls up half a window.
    pub fn half_page_up(&mut self) {
        self.scroll_up((self.height / 2).max(1));
    }

    /// Jumps to the first row.
    pub fn goto_top(&mut self) {
        self.y_offset = 0;
    }

    /// Jumps so the last row is visible.
    pub fn goto_bottom(&mut self) {
        self.y_offset = self.max_y_offset();
    }

    /// Scrolls the minimum amount needed for row `index` to be visible.
    pub fn ensure_visible(&mut self, index: usize) {
        if self.height == 0 {
            return;
        }
        if index < self.y_offset {
            self.y_offset = index;
        } else if index >= self.y_offset + self.height {
            self.set_y_offset(index + 1 - self.height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_are_clamped() {
        let mut vp = Model::new(4);
        vp.set_content_len(10);
        vp.set_y_offset(100);
        assert_eq!(vp.y_offset(), 6);
        assert!(vp.at_bottom());
        vp.scroll_up(10);
        assert!(vp.at_top());
    }

    #[test]
    fn test_short_content_fits() {
        let mut vp = Model::new(8);
        vp.set_content_len(3);
        assert!(vp.at_top());
        assert!(vp.at_bottom());
        assert_eq!(vp.visible_range(), 0..3);
        assert_eq!(vp.scroll_percent(), 1.0);
    }

    #[test]
    fn test_appending_keeps_position() {
        let mut vp = Model::new(4);
        vp.set_content_len(10);
        vp.goto_bottom();
        vp.set_content_len(20);
        assert_eq!(vp.y_offset(), 6);
        assert!(!vp.at_bottom());
    }

    #[test]
    fn test_ensure_visible() {
        let mut vp = Model::new(3);
        vp.set_content_len(10);
        vp.ensure_visible(5);
        assert_eq!(vp.visible_range(), 3..6);
        vp.ensure_visible(1);
        assert_eq!(vp.visible_range(), 1..4);
        vp.ensure_visible(2);
        assert_eq!(vp.y_offset(), 1);
    }

    #[test]
    fn test_half_page_and_wheel() {
        let mut vp = Model::new(6);
        vp.set_content_len(30);
        vp.half_page_down();
        assert_eq!(vp.y_offset(), 3);
        vp.wheel_down();
        assert_eq!(vp.y_offset(), 6);
        vp.half_page_up();
        vp.wheel_up();
        assert!(vp.at_top());
    }
}
