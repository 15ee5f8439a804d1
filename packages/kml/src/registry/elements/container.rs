//! `<Document>` and `<Folder>` elements.
//!
//! Containers parse their children when constructed and forward updates to
//! them. They have no style of their own; descendants inherit the context
//! style.

use std::any::Any;
use std::sync::Arc;

use crate::error::Result;
use crate::registry::element::{impl_retrieve, ElementBase, KmlElement};
use crate::registry::{ParseContext, Query, Retrieve};
use crate::render::RenderLayer;
use crate::xml::XmlNode;

#[derive(Debug)]
pub struct KmlContainer {
    base: ElementBase,
    children: Vec<Box<dyn KmlElement>>,
}

impl_retrieve!(KmlContainer);

impl KmlContainer {
    pub fn create(node: Arc<XmlNode>, context: ParseContext) -> Result<Box<dyn KmlElement>> {
        Ok(Box::new(Self::new(node, context)?))
    }

    /// # Errors
    /// Returns `MissingNode` if `node` is not an element.
    pub fn new(node: Arc<XmlNode>, context: ParseContext) -> Result<Self> {
        let base = ElementBase::new(node, context, "Document/Folder")?;
        let children = base.context.engine().parse(&base.node, &base.context);
        Ok(Self { base, children })
    }

    pub fn name(&self) -> Option<String> {
        self.retrieve(&Query::child("name"))
    }

    pub fn description(&self) -> Option<String> {
        self.retrieve(&Query::child("description"))
    }

    pub fn visibility(&self) -> bool {
        self.retrieve_bool("visibility").unwrap_or(true)
    }

    pub fn open(&self) -> bool {
        self.retrieve_bool("open").unwrap_or(false)
    }
}

impl KmlElement for KmlContainer {
    fn children(&self) -> &[Box<dyn KmlElement>] {
        &self.children
    }

    fn update(&mut self, layer: &mut dyn RenderLayer) -> Result<()> {
        for child in &mut self.children {
            if let Err(err) = child.update(layer) {
                tracing::warn!(
                    error = %err,
                    tag = %child.tag_name(),
                    "Failed to update element, skipping"
                );
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
