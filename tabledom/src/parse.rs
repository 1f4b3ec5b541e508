//! Lenient parser for conventional table markup.
//!
//! Produces a tree from tag-soup input without ever failing: unknown entities
//! pass through verbatim, a close tag with no matching open tag is dropped,
//! and elements left open at end of input are closed implicitly. This matches
//! how server-rendered table HTML is actually consumed: error recovery over
//! rejection.

use crate::element::{Element, Node};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Parse markup into its top-level nodes.
pub fn parse_document(html: &str) -> Vec<Node> {
    let mut parser = Parser {
        input: html,
        pos: 0,
    };
    let mut roots = Vec::new();
    let mut stack: Vec<Element> = Vec::new();

    while parser.pos < parser.input.len() {
        if parser.eat("<!--") {
            parser.skip_past("-->");
        } else if parser.rest().starts_with("<!") || parser.rest().starts_with("<?") {
            parser.skip_past(">");
        } else if parser.eat("</") {
            let name = parser.take_tag_name();
            parser.skip_past(">");
            close_tag(&name, &mut stack, &mut roots);
        } else if looks_like_open_tag(parser.rest()) {
            parser.pos += 1; // '<'
            let (element, self_closing) = parser.parse_open_tag();
            if self_closing || is_void(element.tag()) {
                append(&mut stack, &mut roots, Node::Element(element));
            } else {
                stack.push(element);
            }
        } else {
            let text = parser.take_text();
            if !text.is_empty() {
                append(&mut stack, &mut roots, Node::Text(unescape(text)));
            }
        }
    }

    // Close anything left open at end of input.
    while let Some(element) = stack.pop() {
        append(&mut stack, &mut roots, Node::Element(element));
    }

    roots
}

/// Parse markup and return its first top-level element, if any.
pub fn parse_element(html: &str) -> Option<Element> {
    parse_document(html).into_iter().find_map(|node| match node {
        Node::Element(el) => Some(el),
        Node::Text(_) => None,
    })
}

fn append(stack: &mut [Element], roots: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

/// Pop the stack down to (and including) the nearest open element with the
/// given tag, attaching each popped element to its parent. A close tag with no
/// matching open element is ignored.
fn close_tag(name: &str, stack: &mut Vec<Element>, roots: &mut Vec<Node>) {
    let Some(depth) = stack.iter().rposition(|el| el.tag() == name) else {
        log::trace!("[parse] dropping unmatched close tag </{name}>");
        return;
    };
    while stack.len() > depth {
        let Some(element) = stack.pop() else { break };
        append(stack, roots, Node::Element(element));
    }
}

fn looks_like_open_tag(rest: &str) -> bool {
    let mut chars = rest.chars();
    chars.next() == Some('<') && matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
}

fn looks_like_markup(rest: &str) -> bool {
    let mut chars = rest.chars();
    if chars.next() != Some('<') {
        return false;
    }
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '/' || c == '!' || c == '?')
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn skip_past(&mut self, delimiter: &str) {
        match self.rest().find(delimiter) {
            Some(offset) => self.pos += offset + delimiter.len(),
            None => self.pos = self.input.len(),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// A text run: everything up to the next markup-looking `<`. A bare `<`
    /// that opens nothing is literal text.
    fn take_text(&mut self) -> &'a str {
        let start = self.pos;
        self.bump();
        while let Some(c) = self.peek() {
            if c == '<' && looks_like_markup(self.rest()) {
                break;
            }
            self.bump();
        }
        &self.input[start..self.pos]
    }

    fn take_tag_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':' {
                self.bump();
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_ascii_lowercase()
    }

    /// Attributes until `>` or `/>`. Returns the element and whether the tag
    /// self-closed.
    fn parse_open_tag(&mut self) -> (Element, bool) {
        let name = self.take_tag_name();
        let mut element = Element::new(name);
        loop {
            self.skip_whitespace();
            if self.eat("/>") {
                return (element, true);
            }
            if self.eat(">") {
                return (element, false);
            }
            if self.peek().is_none() {
                // Truncated input mid-tag.
                return (element, false);
            }
            let attr_name = self.take_attr_name();
            if attr_name.is_empty() {
                self.bump();
                continue;
            }
            self.skip_whitespace();
            let value = if self.eat("=") {
                self.skip_whitespace();
                self.take_attr_value()
            } else {
                String::new()
            };
            element.set_attribute(&attr_name, value);
        }
    }

    fn take_attr_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '=' || c == '>' || c == '/' {
                break;
            }
            self.bump();
        }
        self.input[start..self.pos].to_ascii_lowercase()
    }

    fn take_attr_value(&mut self) -> String {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c == quote {
                        break;
                    }
                    self.bump();
                }
                let raw = &self.input[start..self.pos];
                self.bump();
                unescape(raw)
            }
            _ => {
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c.is_whitespace() || c == '>' {
                        break;
                    }
                    self.bump();
                }
                unescape(&self.input[start..self.pos])
            }
        }
    }
}

/// Decode the named entities that table markup actually contains, plus
/// numeric references. Anything unrecognized stays verbatim.
fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let entity_end = rest.find(';').filter(|end| *end <= 32);
        if let Some(end) = entity_end {
            if let Some(decoded) = decode_entity(&rest[1..end]) {
                out.push(decoded);
                rest = &rest[end + 1..];
                continue;
            }
        }
        out.push('&');
        rest = &rest[1..];
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse().ok()?
            } else {
                return None;
            };
            char::from_u32(code)
        }
    }
}
