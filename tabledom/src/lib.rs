pub mod element;
pub mod focus;
pub mod parse;
pub mod selector;
pub mod serialize;

pub use element::{
    contains, find_by_html_id, find_node, find_node_mut, for_each_element, for_each_element_mut,
    parent_of, path_to, replace_node, Element, Node, NodeId,
};
pub use focus::FocusState;
pub use parse::{parse_document, parse_element};
pub use selector::{capture_path, resolve_path, SelectorPath, SimpleSelector};
pub use serialize::{serialize, serialize_nodes};
