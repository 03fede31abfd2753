//! Scroll-proximity detection for incrementally loaded lists.
//!
//! A sentinel marks one row (normally the last rendered one) and reports when
//! that row comes within `margin` rows of the visible window. The margin lets
//! the next page be requested before the user actually reaches the end, which
//! hides fetch latency.
//!
//! Detection is edge-triggered, like a browser intersection observer: a
//! sentinel reports once when its row enters the extended window, and once
//! right after being attached if the row is already inside it. Whenever rows
//! are appended the owner must [`ViewportSentinel::attach`] it to the new last
//! row.

use crate::viewport;

/// Watches one row of a [`viewport::Model`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportSentinel {
    margin: usize,
    target: Option<usize>,
    was_intersecting: Option<bool>,
}

impl Default for ViewportSentinel {
    fn default() -> Self {
        Self::new(2)
    }
}

impl ViewportSentinel {
    /// Creates a detached sentinel that fires `margin` rows ahead of the
    /// visible edge.
    pub fn new(margin: usize) -> Self {
        Self {
            margin,
            target: None,
            was_intersecting: None,
        }
    }

    /// Pre-emptive margin in rows.
    pub fn margin(&self) -> usize {
        self.margin
    }

    /// Row currently watched, if any.
    pub fn target(&self) -> Option<usize> {
        self.target
    }

    /// Watches `row`. Re-attaching to a different row resets edge detection so
    /// the next [`observe`](Self::observe) reports the new row's state.
    pub fn attach(&mut self, row: usize) {
        if self.target != Some(row) {
            self.target = Some(row);
            self.was_intersecting = None;
        }
    }

    /// Stops watching.
    pub fn detach(&mut self) {
        self.target = None;
        self.was_intersecting = None;
    }

    /// Forgets the last observation while keeping the watched row, so the
    /// next [`observe`](Self::observe) reports the row again if it is still
    /// in view.
    pub fn rearm(&mut self) {
        self.was_intersecting = None;
    }

    /// Whether the watched row lies within the window extended by the margin.
    pub fn is_intersecting(&self, viewport: &viewport::Model) -> bool {
        let Some(row) = self.target else {
            return false;
        };
        if row >= viewport.content_len() {
            return false;
        }
        let top = viewport.y_offset().saturating_sub(self.margin);
        let bottom = viewport.y_offset() + viewport.height + self.margin;
        row >= top && row < bottom
    }

    /// Returns true when the watched row has just become visible (or was
    /// visible when first observed after attaching).
    pub fn observe(&mut self, viewport: &viewport::Model) -> bool {
        if self.target.is_none() {
            return false;
        }
        let now = self.is_intersecting(viewport);
        let fired = now && self.was_intersecting != Some(true);
        self.was_intersecting = Some(now);
        fired
    }
}
