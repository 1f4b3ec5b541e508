//! Structural element paths for re-finding a node after a subtree rebuild.
//!
//! Host sandboxes that restrict selector queries to simple selectors cannot
//! express `div > ul > li:nth-child(2)`. This module keeps the same restricted
//! vocabulary: a path is a root-first sequence of simple selectors (tag, id,
//! classes, attributes, no combinators), matched by descending one
//! child-element level per selector and taking the first child that matches.

use std::fmt;

use crate::element::{path_to, Element, NodeId};

/// One level of a [`SelectorPath`].
///
/// `attributes` excludes `id` and `class`, which have their own fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleSelector {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
}

impl SimpleSelector {
    /// Record the selector describing an element as it currently stands.
    pub fn of(element: &Element) -> Self {
        Self {
            tag: element.tag().to_string(),
            id: element.html_id().map(str::to_string),
            classes: element.classes().map(str::to_string).collect(),
            attributes: element
                .attributes()
                .filter(|(name, _)| *name != "id" && *name != "class")
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    /// Whether an element satisfies this selector.
    ///
    /// Classes and attributes are subset checks: the element may carry more
    /// than the selector records, never less.
    pub fn matches(&self, element: &Element) -> bool {
        if element.tag() != self.tag {
            return false;
        }
        if let Some(id) = &self.id {
            if element.html_id() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| element.has_class(class)) {
            return false;
        }
        self.attributes
            .iter()
            .all(|(name, value)| element.attribute(name) == Some(value.as_str()))
    }
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)?;
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        for (name, value) in &self.attributes {
            write!(f, "[{name}=\"{value}\"]")?;
        }
        Ok(())
    }
}

/// Root-first sequence of simple selectors identifying one element under an
/// ancestor. Captured once before a rebuild, resolved once after, then
/// discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorPath(Vec<SimpleSelector>);

impl SelectorPath {
    pub fn new(selectors: Vec<SimpleSelector>) -> Self {
        Self(selectors)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimpleSelector> {
        self.0.iter()
    }
}

impl fmt::Display for SelectorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " > ")?;
            }
            write!(f, "{selector}")?;
        }
        Ok(())
    }
}

/// Record the selector path from `ancestor` (exclusive) down to the node with
/// the given identity. Capturing the ancestor itself yields an empty path,
/// which [`resolve_path`] refuses to match.
pub fn capture_path(ancestor: &Element, target: NodeId) -> Option<SelectorPath> {
    let chain = path_to(ancestor, target)?;
    let selectors = chain
        .iter()
        .skip(1)
        .map(|element| SimpleSelector::of(element))
        .collect();
    Some(SelectorPath::new(selectors))
}

/// Walk a selector path down from `ancestor`, one child-element level per
/// selector, taking the first matching child at each level. Returns None as
/// soon as a level has no match.
pub fn resolve_path<'a>(ancestor: &'a Element, path: &SelectorPath) -> Option<&'a Element> {
    if path.is_empty() {
        return None;
    }
    let mut current = ancestor;
    for (depth, selector) in path.iter().enumerate() {
        match current.child_elements().find(|child| selector.matches(child)) {
            Some(child) => current = child,
            None => {
                log::trace!("[selector] no match at depth {depth} for {selector}");
                return None;
            }
        }
    }
    Some(current)
}
