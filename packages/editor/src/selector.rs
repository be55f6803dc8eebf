//! # Selector Resolver
//!
//! Derives a stable CSS-like path for an element and resolves such paths
//! back to elements.
//!
//! Paths run from the element up to (excluding) `body`. Each segment is
//! `tag`, `tag:nth-of-type(k)` when same-tag siblings exist, or `tag#id`,
//! in which case the walk stops because ids are page-unique:
//!
//! ```text
//! section#services > div:nth-of-type(2) > h3
//! ```
//!
//! The parser understands the produced grammar plus attribute selectors,
//! classes and descendant combinators so that hosts without a native query
//! engine can resolve selectors too.

use crate::errors::EditorError;
use crate::page::Page;

/// Build the path identifying `node`
pub fn resolve<P: Page>(page: &P, node: &P::Node) -> String {
    let body = page.body();
    let mut segments = Vec::new();
    let mut current = Some(node.clone());

    while let Some(element) = current {
        if Some(&element) == body.as_ref() {
            break;
        }

        let tag = page.tag_name(&element);
        if let Some(id) = page.id(&element) {
            segments.push(format!("{}#{}", tag, escape_identifier(&id)));
            break;
        }

        let parent = page.parent(&element);
        let mut segment = tag.clone();
        if let Some(parent) = &parent {
            let same_tag: Vec<P::Node> = page
                .children(parent)
                .into_iter()
                .filter(|sibling| page.tag_name(sibling) == tag)
                .collect();
            if same_tag.len() > 1 {
                if let Some(position) = same_tag.iter().position(|sibling| sibling == &element) {
                    segment.push_str(&format!(":nth-of-type({})", position + 1));
                }
            }
        }
        segments.push(segment);
        current = parent;
    }

    segments.reverse();
    segments.join(" > ")
}

/// Escape an identifier for use in a selector (CSSOM `CSS.escape`)
pub fn escape_identifier(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());

    for (index, &c) in chars.iter().enumerate() {
        let code = c as u32;
        if code == 0 {
            out.push('\u{FFFD}');
        } else if (0x01..=0x1F).contains(&code)
            || code == 0x7F
            || (index == 0 && c.is_ascii_digit())
            || (index == 1 && c.is_ascii_digit() && chars[0] == '-')
        {
            out.push_str(&format!("\\{:x} ", code));
        } else if index == 0 && c == '-' && chars.len() == 1 {
            out.push_str("\\-");
        } else if code >= 0x80 || c == '-' || c == '_' || c.is_ascii_alphanumeric() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }

    out
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq)]
struct AttributeMatch {
    name: String,
    value: Option<String>,
}

/// One compound selector such as `div#main` or `li:nth-of-type(3)`
#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    nth_of_type: Option<usize>,
    attributes: Vec<AttributeMatch>,
}

/// Parsed selector, matched right to left
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    /// `(combinator to the previous compound, compound)`; the first
    /// combinator is unused
    parts: Vec<(Combinator, Compound)>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, EditorError> {
        Parser::new(source).parse()
    }

    /// Whether `node` matches this selector
    pub fn matches<P: Page>(&self, page: &P, node: &P::Node) -> bool {
        self.matches_from(page, node, self.parts.len() - 1)
    }

    fn matches_from<P: Page>(&self, page: &P, node: &P::Node, index: usize) -> bool {
        let (combinator, compound) = &self.parts[index];
        if !compound_matches(page, node, compound) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => page
                .parent(node)
                .map_or(false, |parent| self.matches_from(page, &parent, index - 1)),
            Combinator::Descendant => {
                let mut ancestor = page.parent(node);
                while let Some(a) = ancestor {
                    if self.matches_from(page, &a, index - 1) {
                        return true;
                    }
                    ancestor = page.parent(&a);
                }
                false
            }
        }
    }
}

fn compound_matches<P: Page>(page: &P, node: &P::Node, compound: &Compound) -> bool {
    let tag = page.tag_name(node);
    if let Some(expected) = &compound.tag {
        if expected != &tag {
            return false;
        }
    }
    if let Some(expected) = &compound.id {
        if page.id(node).as_deref() != Some(expected.as_str()) {
            return false;
        }
    }
    if !compound.classes.is_empty() {
        let class_attr = page.attribute(node, "class").unwrap_or_default();
        let classes: Vec<&str> = class_attr.split_whitespace().collect();
        if !compound.classes.iter().all(|c| classes.contains(&c.as_str())) {
            return false;
        }
    }
    for attribute in &compound.attributes {
        match (page.attribute(node, &attribute.name), &attribute.value) {
            (None, _) => return false,
            (Some(actual), Some(expected)) if &actual != expected => return false,
            _ => {}
        }
    }
    if let Some(k) = compound.nth_of_type {
        let position = match page.parent(node) {
            Some(parent) => page
                .children(&parent)
                .into_iter()
                .filter(|sibling| page.tag_name(sibling) == tag)
                .position(|sibling| &sibling == node)
                .map(|p| p + 1),
            None => Some(1),
        };
        if position != Some(k) {
            return false;
        }
    }
    true
}

/// First element in document order matching `selector`
pub fn query_first<P: Page>(page: &P, root: &P::Node, selector: &Selector) -> Option<P::Node> {
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        if selector.matches(page, &node) {
            return Some(node);
        }
        let mut children = page.children(&node);
        children.reverse();
        stack.extend(children);
    }
    None
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> EditorError {
        EditorError::invalid_selector(self.source, reason)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn expect(&mut self, expected: char) -> Result<(), EditorError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected `{}`, found `{}`", expected, c))),
            None => Err(self.error(format!("expected `{}`, found end of input", expected))),
        }
    }

    fn parse(mut self) -> Result<Selector, EditorError> {
        let mut parts = Vec::new();
        self.skip_whitespace();
        let mut combinator = Combinator::Descendant;

        loop {
            let compound = self.parse_compound()?;
            parts.push((combinator, compound));

            let had_space = self.skip_whitespace();
            match self.peek() {
                None => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    combinator = Combinator::Child;
                }
                Some(_) if had_space => combinator = Combinator::Descendant,
                Some(c) => return Err(self.error(format!("unexpected `{}`", c))),
            }
        }

        Ok(Selector { parts })
    }

    fn parse_compound(&mut self) -> Result<Compound, EditorError> {
        let mut compound = Compound::default();
        let mut seen_any = false;

        match self.peek() {
            Some('*') => {
                self.pos += 1;
                seen_any = true;
            }
            Some(c) if is_ident_start(c) => {
                compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
                seen_any = true;
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.parse_ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.parse_ident()?);
                }
                Some(':') => {
                    self.pos += 1;
                    compound.nth_of_type = Some(self.parse_nth_of_type()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attributes.push(self.parse_attribute()?);
                }
                _ => break,
            }
            seen_any = true;
        }

        if !seen_any {
            return Err(match self.peek() {
                Some(c) => self.error(format!("unexpected `{}`", c)),
                None => self.error("empty selector"),
            });
        }
        Ok(compound)
    }

    fn parse_nth_of_type(&mut self) -> Result<usize, EditorError> {
        let name = self.parse_ident()?;
        if name != "nth-of-type" {
            return Err(self.error(format!("unsupported pseudo-class `{}`", name)));
        }
        self.expect('(')?;
        self.skip_whitespace();
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        let k = digits
            .parse::<usize>()
            .map_err(|_| self.error("nth-of-type expects a positive integer"))?;
        self.skip_whitespace();
        self.expect(')')?;
        Ok(k)
    }

    fn parse_attribute(&mut self) -> Result<AttributeMatch, EditorError> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        let value = if self.peek() == Some('=') {
            self.pos += 1;
            self.skip_whitespace();
            let value = match self.peek() {
                Some(quote @ ('"' | '\'')) => self.parse_quoted(quote)?,
                _ => self.parse_ident()?,
            };
            self.skip_whitespace();
            Some(value)
        } else {
            None
        };
        self.expect(']')?;
        Ok(AttributeMatch { name, value })
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String, EditorError> {
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(value);
                }
                Some('\\') => {
                    self.pos += 1;
                    value.push(self.parse_escape()?);
                }
                Some(c) => {
                    self.pos += 1;
                    value.push(c);
                }
            }
        }
    }

    fn parse_ident(&mut self) -> Result<String, EditorError> {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                ident.push(self.parse_escape()?);
            } else if is_ident_char(c) {
                self.pos += 1;
                ident.push(c);
            } else {
                break;
            }
        }
        if ident.is_empty() {
            return Err(self.error("expected identifier"));
        }
        Ok(ident)
    }

    /// Consume the escape sequence after a backslash
    fn parse_escape(&mut self) -> Result<char, EditorError> {
        let start = self.pos;
        while self.pos - start < 6 && matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
            self.pos += 1;
        }
        if self.pos > start {
            let hex: String = self.chars[start..self.pos].iter().collect();
            if matches!(self.peek(), Some(c) if c.is_whitespace()) {
                self.pos += 1;
            }
            let code = u32::from_str_radix(&hex, 16).map_err(|_| self.error("bad escape"))?;
            return Ok(char::from_u32(code)
                .filter(|c| *c != '\0')
                .unwrap_or('\u{FFFD}'));
        }
        match self.peek() {
            Some(c) => {
                self.pos += 1;
                Ok(c)
            }
            None => Err(self.error("dangling escape")),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || c == '\\' || (c as u32) >= 0x80
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || (c as u32) >= 0x80
}
