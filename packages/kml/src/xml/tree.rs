//! Owned, immutable XML tree.
//!
//! `roxmltree` documents borrow their input text, which makes them awkward to
//! keep alive next to the elements built from them. The tree is therefore
//! copied once into `XmlNode`s that are shared through `Arc`: every element
//! holds the node it was built from, and the node never changes afterwards.

use std::sync::Arc;

use roxmltree::{Document, Node, NodeType};

use crate::config::ROOT_TAG;
use crate::error::{KmlError, Result};

/// Kind of a node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
}

/// A single node of an owned XML tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    kind: NodeKind,
    name: String,
    value: String,
    attributes: Vec<(String, String)>,
    children: Vec<Arc<XmlNode>>,
}

impl XmlNode {
    /// Create an element node.
    pub fn element(
        name: impl Into<String>,
        attributes: Vec<(String, String)>,
        children: Vec<Arc<XmlNode>>,
    ) -> Self {
        Self {
            kind: NodeKind::Element,
            name: name.into(),
            value: String::new(),
            attributes,
            children,
        }
    }

    /// Create a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text,
            name: String::new(),
            value: value.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a comment node.
    pub fn comment(value: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Comment,
            ..Self::text(value)
        }
    }

    /// Copy a `roxmltree` node and its subtree.
    ///
    /// Returns `None` for node types that are not kept (processing
    /// instructions and the document root).
    pub fn from_roxml(node: Node<'_, '_>) -> Option<Arc<Self>> {
        let copied = match node.node_type() {
            NodeType::Element => {
                let attributes = node
                    .attributes()
                    .map(|a| (a.name().to_string(), a.value().to_string()))
                    .collect();
                let children = node.children().filter_map(Self::from_roxml).collect();
                Self::element(node.tag_name().name(), attributes, children)
            }
            NodeType::Text => Self::text(node.text().unwrap_or_default()),
            NodeType::Comment => Self::comment(node.text().unwrap_or_default()),
            NodeType::Root | NodeType::PI => return None,
        };
        Some(Arc::new(copied))
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    /// Tag name without namespace prefix; empty for non-element nodes.
    pub fn tag_name(&self) -> &str {
        &self.name
    }

    /// Content of a text or comment node.
    pub fn value(&self) -> Option<&str> {
        match self.kind {
            NodeKind::Element => None,
            NodeKind::Text | NodeKind::Comment => Some(&self.value),
        }
    }

    /// Value of an attribute on this node.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// All immediate children, including text and comment nodes.
    pub fn children(&self) -> &[Arc<XmlNode>] {
        &self.children
    }

    /// Immediate element children only.
    pub fn element_children(&self) -> impl Iterator<Item = &Arc<XmlNode>> {
        self.children.iter().filter(|c| c.is_element())
    }

    /// Value of the first text child, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.children
            .iter()
            .find(|c| c.is_text())
            .and_then(|c| c.value())
    }

    /// Depth-first, document-order iterator over this node and all of its
    /// descendants.
    pub fn descendants(self: &Arc<Self>) -> Descendants {
        Descendants {
            stack: vec![Arc::clone(self)],
        }
    }
}

/// Iterator returned by [`XmlNode::descendants`].
pub struct Descendants {
    stack: Vec<Arc<XmlNode>>,
}

impl Iterator for Descendants {
    type Item = Arc<XmlNode>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev().cloned());
        Some(node)
    }
}

/// Parse markup and return its `<kml>` root element.
///
/// The root is the first element named `kml` in document order; the
/// namespace is ignored.
///
/// # Examples
/// ```
/// use kml_scene::xml::parse_document;
///
/// let root = parse_document(r#"<kml xmlns="http://www.opengis.net/kml/2.2"><Placemark/></kml>"#).unwrap();
/// assert_eq!(root.tag_name(), "kml");
/// assert_eq!(root.element_children().count(), 1);
/// ```
pub fn parse_document(markup: &str) -> Result<Arc<XmlNode>> {
    let doc = Document::parse(markup)?;
    doc.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == ROOT_TAG)
        .and_then(XmlNode::from_roxml)
        .ok_or_else(|| KmlError::MissingElement {
            element: ROOT_TAG.to_string(),
            context: "document".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_keeps_text_and_comments() {
        let root = parse_document("<kml>text<!-- note --><Placemark/></kml>").unwrap();
        let kinds: Vec<_> = root.children().iter().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::Text, NodeKind::Comment, NodeKind::Element]
        );
    }

    #[test]
    fn test_parse_document_nested_root() {
        let root = parse_document("<wrapper><kml><Folder/></kml></wrapper>").unwrap();
        assert_eq!(root.tag_name(), "kml");
        assert_eq!(root.element_children().next().unwrap().tag_name(), "Folder");
    }

    #[test]
    fn test_parse_document_without_root() {
        let result = parse_document("<Document/>");
        assert!(matches!(result, Err(KmlError::MissingElement { .. })));
    }

    #[test]
    fn test_parse_document_invalid_xml() {
        let result = parse_document("<kml><Placemark></kml>");
        assert!(matches!(result, Err(KmlError::XmlParse(_))));
    }

    #[test]
    fn test_attribute_lookup_strips_prefix() {
        let root = parse_document(
            r#"<kml xmlns:gx="http://www.google.com/kml/ext/2.2"><gx:Tour id="t1"/></kml>"#,
        )
        .unwrap();
        let tour = root.element_children().next().unwrap();
        assert_eq!(tour.tag_name(), "Tour");
        assert_eq!(tour.attribute("id"), Some("t1"));
        assert_eq!(tour.attribute("missing"), None);
    }

    #[test]
    fn test_first_text() {
        let root = parse_document("<kml><name>Park</name><empty/></kml>").unwrap();
        let mut children = root.element_children();
        assert_eq!(children.next().unwrap().first_text(), Some("Park"));
        assert_eq!(children.next().unwrap().first_text(), None);
    }

    #[test]
    fn test_descendants_document_order() {
        let root = parse_document("<kml><a><b/></a><c/></kml>").unwrap();
        let names: Vec<String> = root
            .descendants()
            .filter(|n| n.is_element())
            .map(|n| n.tag_name().to_string())
            .collect();
        assert_eq!(names, vec!["kml", "a", "b", "c"]);
    }
}
