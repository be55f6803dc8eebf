//! # Virtual Page
//!
//! Arena-backed in-memory document implementing [`Page`]. Used by tests and
//! by headless tools that want to hydrate static markup with saved edits.
//!
//! Markup is parsed leniently: text and attribute values are kept verbatim
//! (entities are not decoded), unknown closing tags are ignored and void
//! elements never take children.

use crate::errors::EditorError;
use crate::layout::{Rect, Viewport};
use crate::page::{FormatCommand, Page};
use crate::selector::{query_first, Selector};

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];
const RAW_TEXT_TAGS: &[&str] = &["script", "style", "textarea", "title"];

/// Handle to a node in a [`VirtualPage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<NodeId>,
        rect: Rect,
        editable: bool,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct VNode {
    parent: Option<NodeId>,
    kind: NodeKind,
}

/// In-memory document
#[derive(Debug, Clone)]
pub struct VirtualPage {
    nodes: Vec<VNode>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    viewport: Viewport,
    focused: Option<NodeId>,
}

impl Default for VirtualPage {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualPage {
    /// Empty `<html><head></head><body></body></html>` document
    pub fn new() -> Self {
        let mut page = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            viewport: Viewport::default(),
            focused: None,
        };
        page.root = page.create_element("html");
        page.head = page.append_element(page.root, "head");
        page.body = page.append_element(page.root, "body");
        page
    }

    /// Parse a full document. Markup without an `<html>` element is placed
    /// inside `<body>`.
    pub fn from_html(html: &str) -> Self {
        let mut page = Self::new();
        let scratch = page.create_element("#document");
        page.parse_into(scratch, html);

        let html_element = page
            .element_children(scratch)
            .into_iter()
            .find(|id| page.tag(*id) == Some("html"));

        match html_element {
            Some(html_element) => {
                page.detach(html_element);
                page.root = html_element;
                let children = page.element_children(html_element);
                match children.iter().find(|id| page.tag(**id) == Some("head")) {
                    Some(head) => page.head = *head,
                    None => {
                        let head = page.create_element("head");
                        page.insert_child(html_element, 0, head);
                        page.head = head;
                    }
                }
                match children.iter().find(|id| page.tag(**id) == Some("body")) {
                    Some(body) => page.body = *body,
                    None => page.body = page.append_element(html_element, "body"),
                }
            }
            None => {
                let body_element = page
                    .element_children(scratch)
                    .into_iter()
                    .find(|id| page.tag(*id) == Some("body"));
                match body_element {
                    Some(body_element) => {
                        page.detach(body_element);
                        page.detach(page.body);
                        page.push_child(page.root, body_element);
                        page.body = body_element;
                    }
                    None => {
                        for child in page.all_children(scratch) {
                            page.detach(child);
                            page.push_child(page.body, child);
                        }
                    }
                }
            }
        }
        page
    }

    pub fn body_id(&self) -> NodeId {
        self.body
    }

    /// Create a detached element and append it to `parent`
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.create_element(tag);
        self.push_child(parent, id);
        id
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.push_node(NodeKind::Text(text.to_string()));
        self.push_child(parent, id);
        id
    }

    pub fn set_rect(&mut self, node: NodeId, new_rect: Rect) {
        if let NodeKind::Element { rect, .. } = &mut self.nodes[node.0].kind {
            *rect = new_rect;
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn is_editable(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].kind, NodeKind::Element { editable: true, .. })
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Whether `node` is still reachable from the document root
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.root {
                return true;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }

    /// Serialize the whole document
    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>");
        self.write_node(self.root, &mut out);
        out
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(VNode { parent: None, kind });
        id
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
            rect: Rect::default(),
            editable: false,
        })
    }

    fn push_child(&mut self, parent: NodeId, child: NodeId) {
        if let NodeKind::Element { children, .. } = &mut self.nodes[parent.0].kind {
            children.push(child);
            self.nodes[child.0].parent = Some(parent);
        }
    }

    fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if let NodeKind::Element { children, .. } = &mut self.nodes[parent.0].kind {
            let index = index.min(children.len());
            children.insert(index, child);
            self.nodes[child.0].parent = Some(parent);
        }
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            if let NodeKind::Element { children, .. } = &mut self.nodes[parent.0].kind {
                children.retain(|c| *c != node);
            }
        }
    }

    fn all_children(&self, node: NodeId) -> Vec<NodeId> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { children, .. } => children.clone(),
            _ => Vec::new(),
        }
    }

    fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.all_children(node)
            .into_iter()
            .filter(|c| matches!(self.nodes[c.0].kind, NodeKind::Element { .. }))
            .collect()
    }

    fn clear_children(&mut self, node: NodeId) {
        for child in self.all_children(node) {
            self.nodes[child.0].parent = None;
        }
        if let NodeKind::Element { children, .. } = &mut self.nodes[node.0].kind {
            children.clear();
        }
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::Element {
                tag,
                attributes,
                children,
                ..
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&value.replace('"', "&quot;"));
                    out.push('"');
                }
                out.push('>');
                if VOID_TAGS.contains(&tag.as_str()) {
                    return;
                }
                for child in children {
                    self.write_node(*child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn parse_into(&mut self, container: NodeId, html: &str) {
        let mut stack = vec![container];
        let mut rest = html;

        while !rest.is_empty() {
            let parent = *stack.last().unwrap_or(&container);

            if let Some(after) = rest.strip_prefix("<!--") {
                let (comment, tail) = match after.find("-->") {
                    Some(end) => (&after[..end], &after[end + 3..]),
                    None => (after, ""),
                };
                let id = self.push_node(NodeKind::Comment(comment.to_string()));
                self.push_child(parent, id);
                rest = tail;
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                rest = rest.find('>').map_or("", |end| &rest[end + 1..]);
            } else if let Some(after) = rest.strip_prefix("</") {
                let end = after.find('>').unwrap_or(after.len());
                let name = after[..end].trim().to_ascii_lowercase();
                if let Some(position) = stack
                    .iter()
                    .rposition(|id| *id != container && self.tag(*id) == Some(name.as_str()))
                {
                    stack.truncate(position);
                }
                rest = after.get(end + 1..).unwrap_or("");
            } else if rest.starts_with('<')
                && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
            {
                let (tag, attributes, self_closing, tail) = parse_open_tag(&rest[1..]);
                let id = self.create_element(&tag);
                if let NodeKind::Element { attributes: attrs, .. } = &mut self.nodes[id.0].kind {
                    *attrs = attributes;
                }
                self.push_child(parent, id);
                rest = tail;

                if RAW_TEXT_TAGS.contains(&tag.as_str()) && !self_closing {
                    let closing = format!("</{}", tag);
                    let end = find_ascii_case_insensitive(rest, &closing).unwrap_or(rest.len());
                    if end > 0 {
                        let text = self.push_node(NodeKind::Text(rest[..end].to_string()));
                        self.push_child(id, text);
                    }
                    rest = &rest[end..];
                    rest = rest.find('>').map_or("", |close| &rest[close + 1..]);
                } else if !self_closing && !VOID_TAGS.contains(&tag.as_str()) {
                    stack.push(id);
                }
            } else {
                let first = rest.chars().next().map_or(1, char::len_utf8);
                let end = rest[first..].find('<').map_or(rest.len(), |i| i + first);
                let text = self.push_node(NodeKind::Text(rest[..end].to_string()));
                self.push_child(parent, text);
                rest = &rest[end..];
            }
        }
    }

    fn title_element(&self) -> Option<NodeId> {
        self.element_children(self.head)
            .into_iter()
            .find(|id| self.tag(*id) == Some("title"))
    }
}

/// Parse `tag attr="v" ...>` (the leading `<` already consumed)
fn parse_open_tag(input: &str) -> (String, Vec<(String, String)>, bool, &str) {
    let name_end = input
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(input.len());
    let tag = input[..name_end].to_ascii_lowercase();
    let mut rest = &input[name_end..];
    let mut attributes = Vec::new();

    loop {
        rest = rest.trim_start();
        if let Some(tail) = rest.strip_prefix("/>") {
            return (tag, attributes, true, tail);
        }
        if let Some(tail) = rest.strip_prefix('>') {
            return (tag, attributes, false, tail);
        }
        if rest.is_empty() {
            return (tag, attributes, false, rest);
        }
        if let Some(tail) = rest.strip_prefix('/') {
            rest = tail;
            continue;
        }

        let name_end = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
            .unwrap_or(rest.len());
        let name = rest[..name_end].to_ascii_lowercase();
        rest = rest[name_end..].trim_start();

        let value = if let Some(after) = rest.strip_prefix('=') {
            let after = after.trim_start();
            match after.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let body = &after[1..];
                    let end = body.find(quote).unwrap_or(body.len());
                    rest = body.get(end + 1..).unwrap_or("");
                    body[..end].to_string()
                }
                _ => {
                    let end = after
                        .find(|c: char| c.is_whitespace() || c == '>')
                        .unwrap_or(after.len());
                    rest = &after[end..];
                    after[..end].to_string()
                }
            }
        } else {
            String::new()
        };

        if !name.is_empty() {
            attributes.push((name, value));
        }
    }
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let haystack_lower = haystack.to_ascii_lowercase();
    haystack_lower.find(&needle.to_ascii_lowercase())
}

impl Page for VirtualPage {
    type Node = NodeId;

    fn body(&self) -> Option<NodeId> {
        Some(self.body)
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.element_children(*node)
    }

    fn tag_name(&self, node: &NodeId) -> String {
        self.tag(*node).unwrap_or_default().to_string()
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[node.0].kind {
            match attributes.iter_mut().find(|(n, _)| n == name) {
                Some((_, existing)) => *existing = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    fn remove_attribute(&mut self, node: &NodeId, name: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[node.0].kind {
            attributes.retain(|(n, _)| n != name);
        }
    }

    fn inner_html(&self, node: &NodeId) -> String {
        let mut out = String::new();
        for child in self.all_children(*node) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn set_inner_html(&mut self, node: &NodeId, html: &str) {
        if self.tag(*node).is_none() {
            return;
        }
        self.clear_children(*node);
        self.parse_into(*node, html);
    }

    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, EditorError> {
        let parsed = Selector::parse(selector)?;
        Ok(query_first(self, &self.root, &parsed))
    }

    fn title(&self) -> String {
        self.title_element()
            .map(|id| self.inner_html(&id))
            .unwrap_or_default()
    }

    fn set_title(&mut self, title: &str) {
        let element = match self.title_element() {
            Some(id) => id,
            None => self.append_element(self.head, "title"),
        };
        self.clear_children(element);
        self.append_text(element, title);
    }

    fn bounding_rect(&self, node: &NodeId) -> Rect {
        match &self.nodes[node.0].kind {
            NodeKind::Element { rect, .. } => *rect,
            _ => Rect::default(),
        }
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_editable(&mut self, node: &NodeId, value: bool) {
        if let NodeKind::Element { editable, .. } = &mut self.nodes[node.0].kind {
            *editable = value;
        }
        if value {
            self.focused = Some(*node);
        } else if self.focused == Some(*node) {
            self.focused = None;
        }
    }

    fn exec_format(&mut self, node: &NodeId, command: &FormatCommand) {
        let inner = self.inner_html(node);
        let wrapped = match command {
            FormatCommand::Bold => format!("<b>{}</b>", inner),
            FormatCommand::Italic => format!("<i>{}</i>", inner),
            FormatCommand::Underline => format!("<u>{}</u>", inner),
            FormatCommand::ForeColor(color) => format!("<font color=\"{}\">{}</font>", color, inner),
            FormatCommand::FontSize(size) => {
                format!("<span style=\"font-size: {}\">{}</span>", size, inner)
            }
        };
        self.set_inner_html(node, &wrapped);
    }
}
