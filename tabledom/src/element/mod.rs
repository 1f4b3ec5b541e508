mod node;

pub use node::{Element, Node, NodeId};

/// Find an element by node identity in the tree.
pub fn find_node(root: &Element, id: NodeId) -> Option<&Element> {
    if root.node_id() == id {
        return Some(root);
    }
    for child in root.child_elements() {
        if let Some(found) = find_node(child, id) {
            return Some(found);
        }
    }
    None
}

/// Mutable variant of [`find_node`].
pub fn find_node_mut(root: &mut Element, id: NodeId) -> Option<&mut Element> {
    if root.node_id() == id {
        return Some(root);
    }
    for child in root.children.iter_mut().filter_map(Node::as_element_mut) {
        if let Some(found) = find_node_mut(child, id) {
            return Some(found);
        }
    }
    None
}

/// Whether a node with the given identity is attached under `root`.
pub fn contains(root: &Element, id: NodeId) -> bool {
    find_node(root, id).is_some()
}

/// Find the first element carrying the given `id` attribute.
pub fn find_by_html_id<'a>(root: &'a Element, html_id: &str) -> Option<&'a Element> {
    if root.html_id() == Some(html_id) {
        return Some(root);
    }
    for child in root.child_elements() {
        if let Some(found) = find_by_html_id(child, html_id) {
            return Some(found);
        }
    }
    None
}

/// Find the parent element of the node with the given identity.
/// Returns None for the root itself or for an unknown node.
pub fn parent_of(root: &Element, id: NodeId) -> Option<&Element> {
    for child in root.child_elements() {
        if child.node_id() == id {
            return Some(root);
        }
        if let Some(found) = parent_of(child, id) {
            return Some(found);
        }
    }
    None
}

/// The chain of elements from `root` down to the target, both inclusive.
pub fn path_to(root: &Element, target: NodeId) -> Option<Vec<&Element>> {
    let mut path = Vec::new();
    if descend(root, target, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn descend<'a>(element: &'a Element, target: NodeId, path: &mut Vec<&'a Element>) -> bool {
    path.push(element);
    if element.node_id() == target {
        return true;
    }
    for child in element.child_elements() {
        if descend(child, target, path) {
            return true;
        }
    }
    path.pop();
    false
}

/// Replace the node with the given identity by `replacement`, in place.
///
/// The swap is a single child-slot assignment, so the tree is never observable
/// in a half-rewritten state. Returns the detached subtree, or None if the
/// target is `root` itself or not in the tree.
pub fn replace_node(root: &mut Element, target: NodeId, replacement: Element) -> Option<Element> {
    replace_in(root, target, replacement).ok()
}

fn replace_in(
    element: &mut Element,
    target: NodeId,
    replacement: Element,
) -> Result<Element, Element> {
    let mut replacement = replacement;
    for child in element.children.iter_mut() {
        let Some(el) = child.as_element_mut() else {
            continue;
        };
        if el.node_id() == target {
            let old = std::mem::replace(child, Node::Element(replacement));
            match old {
                Node::Element(old) => return Ok(old),
                Node::Text(_) => unreachable!("matched element slot"),
            }
        }
        match replace_in(el, target, replacement) {
            Ok(old) => return Ok(old),
            Err(returned) => replacement = returned,
        }
    }
    Err(replacement)
}

/// Visit every element in the tree, pre-order.
pub fn for_each_element(root: &Element, f: &mut impl FnMut(&Element)) {
    f(root);
    for child in root.child_elements() {
        for_each_element(child, f);
    }
}

/// Mutable variant of [`for_each_element`].
pub fn for_each_element_mut(root: &mut Element, f: &mut impl FnMut(&mut Element)) {
    f(root);
    for child in root.children.iter_mut().filter_map(Node::as_element_mut) {
        for_each_element_mut(child, f);
    }
}
