//! Parse engine that builds elements from the children of a node.

use std::sync::Arc;

use super::core::ElementRegistry;
use super::element::KmlElement;
use super::types::ParseContext;
use crate::error::{KmlError, Result};
use crate::xml::{describe, XmlNode};

/// Engine that turns child nodes into typed elements using the registry.
///
/// Unknown tags and elements that fail to construct are logged and left
/// out; their siblings are still parsed.
#[derive(Clone)]
pub struct ParseEngine {
    registry: Arc<ElementRegistry>,
}

impl ParseEngine {
    #[must_use]
    pub fn new(registry: Arc<ElementRegistry>) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Build an element for every recognised child of `node`, in document order.
    pub fn parse(&self, node: &Arc<XmlNode>, context: &ParseContext) -> Vec<Box<dyn KmlElement>> {
        node.element_children()
            .filter(|child| !self.registry.should_skip(child.tag_name()))
            .filter_map(|child| {
                self.create(child, Some(node), context)
                    .unwrap_or_else(|err| {
                        tracing::warn!(
                            error = %err,
                            tag = %child.tag_name(),
                            "Error parsing child element, skipping"
                        );
                        None
                    })
            })
            .collect()
    }

    /// Build the element for a single node.
    ///
    /// Returns `Ok(None)` for skipped tags.
    ///
    /// # Errors
    /// Returns `UnknownElement` if no factory is registered for the tag, or
    /// the factory's construction error.
    pub fn create(
        &self,
        node: &Arc<XmlNode>,
        parent: Option<&Arc<XmlNode>>,
        context: &ParseContext,
    ) -> Result<Option<Box<dyn KmlElement>>> {
        let tag_name = node.tag_name();
        if self.registry.should_skip(tag_name) {
            return Ok(None);
        }

        match self.registry.lookup(tag_name) {
            Some(factory) => factory.create(Arc::clone(node), context.clone()).map(Some),
            None => Err(KmlError::UnknownElement {
                tag_name: tag_name.to_string(),
                context: parent.map(|p| describe(p)),
            }),
        }
    }
}
