//! Node and value retrieval shared by every element.
//!
//! Not finding a node or attribute is a normal outcome and yields `None`.
//! Only malformed calls (empty name lists) are errors.

use std::sync::Arc;

use super::element::KmlElement;
use super::types::ParseContext;
use crate::error::{KmlError, Result};
use crate::xml::XmlNode;

/// What [`Retrieve::retrieve`] reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query<'a> {
    /// Attribute name, or tag name of the child element.
    pub name: &'a str,
    /// Read an attribute of the node itself instead of a child's text.
    pub is_attribute: bool,
}

impl<'a> Query<'a> {
    /// Text of the last child element named `name`.
    pub fn child(name: &'a str) -> Self {
        Self {
            name,
            is_attribute: false,
        }
    }

    /// Attribute `name` of the node itself.
    pub fn attribute(name: &'a str) -> Self {
        Self {
            name,
            is_attribute: true,
        }
    }
}

/// Interpret KML boolean text: `1` and `true` are true, anything else false.
pub fn to_bool(value: &str) -> bool {
    matches!(value.trim(), "1" | "true")
}

/// Interpret numeric text; unparsable values become `None`.
pub fn to_f64(value: &str) -> Option<f64> {
    match value.trim().parse() {
        Ok(number) => Some(number),
        Err(_) => {
            tracing::debug!(value = %value, "Ignoring non-numeric value");
            None
        }
    }
}

/// Lookup operations over the children and attributes of a node.
pub trait Retrieve {
    /// The node this value wraps.
    fn node(&self) -> &Arc<XmlNode>;

    /// All immediate child elements whose tag name is in `names`, in document order.
    fn retrieve_nodes(&self, names: &[&str]) -> Vec<&Arc<XmlNode>> {
        self.node()
            .element_children()
            .filter(|child| names.contains(&child.tag_name()))
            .collect()
    }

    /// The last child element whose tag name is in `names`.
    fn retrieve_node(&self, names: &[&str]) -> Option<&Arc<XmlNode>> {
        self.retrieve_nodes(names).pop()
    }

    /// Attribute `attribute` of the child found by [`Retrieve::retrieve_node`].
    ///
    /// # Errors
    /// Returns `InvalidQuery` if `names` or `attribute` is empty.
    fn retrieve_attribute(&self, names: &[&str], attribute: &str) -> Result<Option<String>> {
        if names.is_empty() || attribute.is_empty() {
            return Err(KmlError::InvalidQuery(format!(
                "child names and attribute name must be given (names: {names:?}, attribute: '{attribute}')"
            )));
        }
        Ok(self
            .retrieve_node(names)
            .and_then(|node| node.attribute(attribute))
            .map(str::to_string))
    }

    /// Read an attribute of this node, or the first text of the last child
    /// named `query.name`.
    ///
    /// A child without text yields `Some("")`; a missing child yields `None`.
    fn retrieve(&self, query: &Query<'_>) -> Option<String> {
        if query.is_attribute {
            return self.node().attribute(query.name).map(str::to_string);
        }
        self.retrieve_node(&[query.name])
            .map(|child| child.first_text().unwrap_or_default().to_string())
    }

    /// [`Retrieve::retrieve`] followed by `transformer` on a present value.
    fn retrieve_with<T, F>(&self, query: &Query<'_>, transformer: F) -> Option<T>
    where
        Self: Sized,
        F: FnOnce(&str) -> T,
    {
        self.retrieve(query).map(|value| transformer(&value))
    }

    /// Child text interpreted with [`to_bool`].
    fn retrieve_bool(&self, name: &str) -> Option<bool> {
        self.retrieve(&Query::child(name)).map(|v| to_bool(&v))
    }

    /// Child text interpreted with [`to_f64`].
    fn retrieve_f64(&self, name: &str) -> Option<f64> {
        self.retrieve(&Query::child(name)).and_then(|v| to_f64(&v))
    }

    /// Build the element for the child found by [`Retrieve::retrieve_node`].
    ///
    /// Returns `Ok(None)` when no child matches or its tag has no factory.
    ///
    /// # Errors
    /// Propagates the child's construction error.
    fn create_child_element(
        &self,
        names: &[&str],
        context: &ParseContext,
    ) -> Result<Option<Box<dyn KmlElement>>> {
        let Some(child) = self.retrieve_node(names) else {
            return Ok(None);
        };
        match context.engine().create(child, Some(self.node()), context) {
            Err(err @ KmlError::UnknownElement { .. }) => {
                tracing::warn!(error = %err, "Child element has no internal representation");
                Ok(None)
            }
            other => other,
        }
    }
}

impl Retrieve for Arc<XmlNode> {
    fn node(&self) -> &Arc<XmlNode> {
        self
    }
}
