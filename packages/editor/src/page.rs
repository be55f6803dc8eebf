//! # Page Abstraction
//!
//! The editor never touches a concrete DOM. It sees the page as a tree of
//! addressable elements that expose markup, an image source or a link
//! target. The browser host implements [`Page`] over `web-sys`; tests and
//! headless tools use [`crate::VirtualPage`].

use std::fmt;

use crate::edits::EditKind;
use crate::errors::EditorError;
use crate::layout::{Rect, Viewport};

/// Ids of the overlay's own root elements. Anything inside them is editor
/// UI and never becomes an edit target.
pub const EDITOR_ROOT_IDS: &[&str] = &[
    "__fe_btn__",
    "__fe_toolbar__",
    "__fe_save__",
    "__fe_img_overlay__",
    "__fe_link_popup__",
    "__fe_seo_modal__",
    "__fe_seo_backdrop__",
];

/// Structural tags that can never be edited as text
pub const SKIP_TAGS: &[&str] = &[
    "script", "style", "html", "head", "body", "link", "meta", "noscript",
];

/// Toolbar formatting commands applied to the active text element
#[derive(Debug, Clone, PartialEq)]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    /// Hex colour such as `#ff0000`
    ForeColor(String),
    /// CSS font size such as `18px`
    FontSize(String),
}

/// Host document the editor operates on
pub trait Page {
    /// Cheap handle to one element
    type Node: Clone + PartialEq + fmt::Debug;

    fn body(&self) -> Option<Self::Node>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Element children in document order (text nodes excluded)
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Lowercase tag name
    fn tag_name(&self, node: &Self::Node) -> String;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    fn remove_attribute(&mut self, node: &Self::Node, name: &str);

    fn inner_html(&self, node: &Self::Node) -> String;

    fn set_inner_html(&mut self, node: &Self::Node, html: &str);

    /// First element matching `selector`, `Ok(None)` when nothing matches
    fn query_selector(&self, selector: &str) -> Result<Option<Self::Node>, EditorError>;

    fn title(&self) -> String;

    fn set_title(&mut self, title: &str);

    fn bounding_rect(&self, node: &Self::Node) -> Rect;

    fn viewport(&self) -> Viewport;

    /// Toggle content-editable (and focus when enabling)
    fn set_editable(&mut self, node: &Self::Node, editable: bool);

    fn exec_format(&mut self, node: &Self::Node, command: &FormatCommand);

    fn id(&self, node: &Self::Node) -> Option<String> {
        self.attribute(node, "id").filter(|id| !id.is_empty())
    }

    fn image_source(&self, node: &Self::Node) -> String {
        self.attribute(node, "src").unwrap_or_default()
    }

    fn set_image_source(&mut self, node: &Self::Node, src: &str) {
        self.set_attribute(node, "src", src);
    }

    fn link_target(&self, node: &Self::Node) -> String {
        self.attribute(node, "href").unwrap_or_default()
    }

    fn set_link_target(&mut self, node: &Self::Node, href: &str) {
        self.set_attribute(node, "href", href);
    }
}

/// Read the property an edit of `kind` targets
pub fn read_value<P: Page>(page: &P, node: &P::Node, kind: EditKind) -> String {
    match kind {
        EditKind::Text => page.inner_html(node),
        EditKind::Image => page.image_source(node),
        EditKind::Link => page.link_target(node),
    }
}

/// Write the property an edit of `kind` targets
pub fn write_value<P: Page>(page: &mut P, node: &P::Node, kind: EditKind, value: &str) {
    match kind {
        EditKind::Text => page.set_inner_html(node, value),
        EditKind::Image => page.set_image_source(node, value),
        EditKind::Link => page.set_link_target(node, value),
    }
}

/// Resolve `selector` and write `value`, treating an invalid selector the
/// same as a miss. Returns whether the value landed on an element.
pub fn apply_at_selector<P: Page>(page: &mut P, selector: &str, kind: EditKind, value: &str) -> bool {
    match page.query_selector(selector) {
        Ok(Some(node)) => {
            write_value(page, &node, kind, value);
            true
        }
        Ok(None) => {
            tracing::debug!(selector, "selector matched no element, skipping");
            false
        }
        Err(e) => {
            tracing::debug!(selector, error = %e, "selector could not be resolved, skipping");
            false
        }
    }
}

/// Nearest ancestor-or-self with the given tag, stopping at `body`
pub fn closest<P: Page>(page: &P, node: &P::Node, tag: &str) -> Option<P::Node> {
    let body = page.body();
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if Some(&n) == body.as_ref() {
            return None;
        }
        if page.tag_name(&n) == tag {
            return Some(n);
        }
        current = page.parent(&n);
    }
    None
}

/// Whether `node` is `ancestor` or lies inside it
pub fn contains<P: Page>(page: &P, ancestor: &P::Node, node: &P::Node) -> bool {
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if &n == ancestor {
            return true;
        }
        current = page.parent(&n);
    }
    false
}

/// Whether `node` belongs to the overlay UI
pub fn is_editor_ui<P: Page>(page: &P, node: &P::Node) -> bool {
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if let Some(id) = page.id(&n) {
            if EDITOR_ROOT_IDS.contains(&id.as_str()) {
                return true;
            }
        }
        current = page.parent(&n);
    }
    false
}

/// Walk up from `node` to the nearest element that can be edited as text
pub fn find_text_target<P: Page>(page: &P, node: &P::Node) -> Option<P::Node> {
    let body = page.body();
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if Some(&n) == body.as_ref() {
            return None;
        }
        let tag = page.tag_name(&n);
        if !SKIP_TAGS.contains(&tag.as_str()) && tag != "img" && tag != "a" {
            return Some(n);
        }
        current = page.parent(&n);
    }
    None
}
