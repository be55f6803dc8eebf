//! [`Page`] over the live browser document

use frontecs_editor::{EditorError, FormatCommand, Page, Rect, Viewport};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlAnchorElement, HtmlDocument, HtmlElement, HtmlImageElement, Window};

use crate::net::describe;

/// `execCommand("fontSize")` only takes 1-7; 7 marks the fragment we
/// restyle afterwards
const FONT_SIZE_MARKER: &str = "7";

#[derive(Clone)]
pub struct DomPage {
    window: Window,
    document: Document,
}

impl DomPage {
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn exec(&self, command: &str, value: Option<&str>) {
        if let Some(document) = self.document.dyn_ref::<HtmlDocument>() {
            let _ = match value {
                Some(value) => document.exec_command_with_show_ui_and_value(command, false, value),
                None => document.exec_command(command),
            };
        }
    }
}

impl Page for DomPage {
    type Node = Element;

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn children(&self, node: &Element) -> Vec<Element> {
        let children = node.children();
        (0..children.length()).filter_map(|i| children.item(i)).collect()
    }

    fn tag_name(&self, node: &Element) -> String {
        node.tag_name().to_ascii_lowercase()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) {
        let _ = node.set_attribute(name, value);
    }

    fn remove_attribute(&mut self, node: &Element, name: &str) {
        let _ = node.remove_attribute(name);
    }

    fn inner_html(&self, node: &Element) -> String {
        node.inner_html()
    }

    fn set_inner_html(&mut self, node: &Element, html: &str) {
        node.set_inner_html(html);
    }

    fn query_selector(&self, selector: &str) -> Result<Option<Element>, EditorError> {
        self.document
            .query_selector(selector)
            .map_err(|e| EditorError::InvalidSelector {
                selector: selector.to_string(),
                reason: describe(&e),
            })
    }

    fn title(&self) -> String {
        self.document.title()
    }

    fn set_title(&mut self, title: &str) {
        self.document.set_title(title);
    }

    fn bounding_rect(&self, node: &Element) -> Rect {
        let rect = node.get_bounding_client_rect();
        Rect::new(rect.left(), rect.top(), rect.width(), rect.height())
    }

    fn viewport(&self) -> Viewport {
        let number = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64());
        let fallback = Viewport::default();
        Viewport {
            width: number(self.window.inner_width()).unwrap_or(fallback.width),
            height: number(self.window.inner_height()).unwrap_or(fallback.height),
            scroll_x: self.window.scroll_x().unwrap_or(0.0),
            scroll_y: self.window.scroll_y().unwrap_or(0.0),
        }
    }

    fn set_editable(&mut self, node: &Element, editable: bool) {
        let Some(element) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        if editable {
            element.set_content_editable("true");
            let _ = element.focus();
        } else {
            element.set_content_editable("false");
            let _ = element.remove_attribute("contenteditable");
        }
    }

    fn exec_format(&mut self, node: &Element, command: &FormatCommand) {
        match command {
            FormatCommand::Bold => self.exec("bold", None),
            FormatCommand::Italic => self.exec("italic", None),
            FormatCommand::Underline => self.exec("underline", None),
            FormatCommand::ForeColor(color) => self.exec("foreColor", Some(color)),
            FormatCommand::FontSize(size) => {
                self.exec("fontSize", Some(FONT_SIZE_MARKER));
                let marked = format!("font[size=\"{}\"]", FONT_SIZE_MARKER);
                if let Ok(fonts) = node.query_selector_all(&marked) {
                    for i in 0..fonts.length() {
                        let Some(font) = fonts.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
                            continue;
                        };
                        let _ = font.remove_attribute("size");
                        let _ = font.style().set_property("font-size", size);
                    }
                }
            }
        }
    }

    fn image_source(&self, node: &Element) -> String {
        match node.dyn_ref::<HtmlImageElement>() {
            Some(image) => image.src(),
            None => node.get_attribute("src").unwrap_or_default(),
        }
    }

    fn set_image_source(&mut self, node: &Element, src: &str) {
        match node.dyn_ref::<HtmlImageElement>() {
            Some(image) => image.set_src(src),
            None => self.set_attribute(node, "src", src),
        }
    }

    fn link_target(&self, node: &Element) -> String {
        match node.dyn_ref::<HtmlAnchorElement>() {
            Some(anchor) => anchor.href(),
            None => node.get_attribute("href").unwrap_or_default(),
        }
    }

    fn set_link_target(&mut self, node: &Element, href: &str) {
        match node.dyn_ref::<HtmlAnchorElement>() {
            Some(anchor) => anchor.set_href(href),
            None => self.set_attribute(node, "href", href),
        }
    }
}
