//! Helpers for navigating owned XML trees.

use super::tree::XmlNode;

/// Get the first text of a node, trimmed; empty string if it has none.
pub fn get_text(node: &XmlNode) -> String {
    node.first_text()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Check if a node is an element with a specific tag name.
pub fn has_tag(node: &XmlNode, tag: &str) -> bool {
    node.is_element() && node.tag_name() == tag
}

/// Short description of a node for log and error messages, e.g. `<Placemark id="p1">`.
pub fn describe(node: &XmlNode) -> String {
    match node.attribute("id") {
        Some(id) => format!("<{} id=\"{id}\">", node.tag_name()),
        None => format!("<{}>", node.tag_name()),
    }
}
