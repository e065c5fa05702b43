// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scroll-to-top button visibility.

/// Default scroll offset, in pixels, past which the button shows
pub const DEFAULT_SCROLL_THRESHOLD: f32 = 300.0;

/// Visibility of the scroll-to-top button
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollToTop {
    threshold: f32,
    visible: bool,
}

impl ScrollToTop {
    /// Create a hidden button with the given threshold
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.max(0.0),
            visible: false,
        }
    }

    /// Recompute visibility for a scroll offset.
    /// Returns true if visibility changed.
    pub fn update(&mut self, offset: f32) -> bool {
        let visible = offset > self.threshold;
        let changed = visible != self.visible;
        self.visible = visible;
        changed
    }

    /// Whether the button is shown
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Default for ScrollToTop {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_THRESHOLD)
    }
}
