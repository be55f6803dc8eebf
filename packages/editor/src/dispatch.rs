//! # Activation / Dispatch
//!
//! Named states and target classification for the single "active editable
//! element" slot. The transitions themselves live on
//! [`crate::EditorSession`]; this module only decides *what* an interaction
//! points at.
//!
//! ```text
//!              click text                click img / a
//!   Idle ───────────────────▶ TextActive ─────────────────▶ ImagePopupOpen
//!    ▲  ◀── commit (click elsewhere,           │             LinkPopupOpen
//!    │       Escape, undo/redo, save)          │                  │
//!    └─────────────────── close / commit ◀─────┴──────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::page::{closest, find_text_target, is_editor_ui, Page};

/// Maximum finger travel (per axis, CSS px) for a touch to count as a tap
pub const TAP_SLOP: f64 = 10.0;

/// Current activation. At most one element is ever active.
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveState<N> {
    Idle,
    /// Text element being edited, with its markup before activation
    TextActive { element: N, before: String },
    ImagePopupOpen { image: N },
    /// Link popup with the current contents of its URL input
    LinkPopupOpen { anchor: N, input: String },
}

impl<N> ActiveState<N> {
    pub fn is_idle(&self) -> bool {
        matches!(self, ActiveState::Idle)
    }

    pub fn active_text(&self) -> Option<&N> {
        match self {
            ActiveState::TextActive { element, .. } => Some(element),
            _ => None,
        }
    }

    pub fn active_image(&self) -> Option<&N> {
        match self {
            ActiveState::ImagePopupOpen { image } => Some(image),
            _ => None,
        }
    }

    pub fn active_link(&self) -> Option<&N> {
        match self {
            ActiveState::LinkPopupOpen { anchor, .. } => Some(anchor),
            _ => None,
        }
    }
}

/// What an interaction resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionTarget<N> {
    /// Inside the overlay's own UI
    EditorUi,
    Image(N),
    Link(N),
    Text(N),
    /// Nothing editable (e.g. a click directly on `body`)
    Nothing,
}

/// Classify the element an interaction landed on
pub fn resolve_target<P: Page>(page: &P, node: &P::Node) -> InteractionTarget<P::Node> {
    if is_editor_ui(page, node) {
        return InteractionTarget::EditorUi;
    }
    if let Some(image) = closest(page, node, "img") {
        return InteractionTarget::Image(image);
    }
    if let Some(anchor) = closest(page, node, "a") {
        return InteractionTarget::Link(anchor);
    }
    match find_text_target(page, node) {
        Some(element) => InteractionTarget::Text(element),
        None => InteractionTarget::Nothing,
    }
}

/// Result of dispatching one interaction, reported back to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Editor UI or a swipe; nothing changed
    Ignored,
    /// Previous activation closed, nothing new activated
    Idle,
    TextActivated,
    ImagePopupOpened,
    LinkPopupOpened,
}

impl Dispatch {
    /// Images and links must not navigate or open while editing
    pub fn prevents_default(&self) -> bool {
        matches!(self, Dispatch::ImagePopupOpened | Dispatch::LinkPopupOpened)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Whether a touch that started at `start` and ended at `end` is a tap
pub fn is_tap(start: Point, end: Point, slop: f64) -> bool {
    (end.x - start.x).abs() <= slop && (end.y - start.y).abs() <= slop
}

/// Remembers where the current touch began
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchTracker {
    start: Option<Point>,
}

impl TouchTracker {
    pub fn begin(&mut self, point: Point) {
        self.start = Some(point);
    }

    /// Finish the touch; true if it was a tap
    pub fn end(&mut self, point: Point, slop: f64) -> bool {
        match self.start.take() {
            Some(start) => is_tap(start, point, slop),
            None => false,
        }
    }
}
