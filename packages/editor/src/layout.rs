//! # Overlay Layout
//!
//! Placement maths for the floating editor UI. All inputs are in CSS
//! pixels; element rectangles are viewport-relative (as reported by
//! `getBoundingClientRect`) and results are document-relative so they can be
//! written straight into `style.top` / `style.left`.

use serde::{Deserialize, Serialize};

/// Gap between the toolbar and the element it is anchored to
const TOOLBAR_GAP: f64 = 10.0;
const TOOLBAR_TOP_MARGIN: f64 = 4.0;
const EDGE_MARGIN: f64 = 8.0;
const LINK_POPUP_GAP: f64 = 8.0;
const LINK_POPUP_HEIGHT: f64 = 44.0;
const IMAGE_OVERLAY_HALF_WIDTH: f64 = 80.0;
const IMAGE_OVERLAY_HALF_HEIGHT: f64 = 20.0;

/// Viewport-relative bounding box of an element
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Window size and scroll offsets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }
}

/// Measured size of a floating panel (0 means "not laid out yet")
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PanelSize {
    pub width: f64,
    pub height: f64,
}

impl PanelSize {
    pub const TOOLBAR_FALLBACK: PanelSize = PanelSize {
        width: 340.0,
        height: 44.0,
    };
}

/// Document-relative position of a floating panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub top: f64,
    pub left: f64,
}

/// Place the formatting toolbar above `target`, flipping below when there
/// is no room above the visible area.
pub fn toolbar_placement(target: Rect, viewport: Viewport, measured: PanelSize) -> Placement {
    let height = if measured.height > 0.0 {
        measured.height
    } else {
        PanelSize::TOOLBAR_FALLBACK.height
    };
    let width = if measured.width > 0.0 {
        measured.width
    } else {
        PanelSize::TOOLBAR_FALLBACK.width
    };

    let mut top = target.top + viewport.scroll_y - height - TOOLBAR_GAP;
    if top < viewport.scroll_y + TOOLBAR_TOP_MARGIN {
        top = target.bottom() + viewport.scroll_y + TOOLBAR_GAP;
    }

    let max_left = viewport.width + viewport.scroll_x - width - EDGE_MARGIN;
    let left = (target.left + viewport.scroll_x).min(max_left).max(EDGE_MARGIN);

    Placement { top, left }
}

/// Centre the image overlay on the image
pub fn image_overlay_placement(target: Rect, viewport: Viewport) -> Placement {
    Placement {
        top: target.top + viewport.scroll_y + target.height / 2.0 - IMAGE_OVERLAY_HALF_HEIGHT,
        left: target.left + viewport.scroll_x + target.width / 2.0 - IMAGE_OVERLAY_HALF_WIDTH,
    }
}

/// Place the link popup under the anchor, or above it when it would
/// overflow the bottom of the viewport.
pub fn link_popup_placement(target: Rect, viewport: Viewport) -> Placement {
    let mut top = target.bottom() + viewport.scroll_y + LINK_POPUP_GAP;
    if top + LINK_POPUP_HEIGHT > viewport.scroll_y + viewport.height {
        top = target.top + viewport.scroll_y - LINK_POPUP_HEIGHT - LINK_POPUP_GAP;
    }
    Placement {
        top,
        left: (target.left + viewport.scroll_x).max(EDGE_MARGIN),
    }
}
