//! Element and factory traits.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::retrieve::{Query, Retrieve};
use super::types::ParseContext;
use crate::error::{KmlError, Result};
use crate::render::{RenderLayer, Renderable, ShapeCommon};
use crate::style::PendingStyle;
use crate::xml::XmlNode;

/// A typed element built from one document node.
///
/// Elements own their node exclusively and never change it after
/// construction. Elements that draw something produce at most one
/// [`Renderable`] and remember its handle between updates.
pub trait KmlElement: Retrieve + fmt::Debug + Send + Sync {
    fn tag_name(&self) -> &str {
        self.node().tag_name()
    }

    /// The optional `id` attribute.
    fn id(&self) -> Option<String> {
        self.retrieve(&Query::attribute("id"))
    }

    /// Style this element resolves for itself, if any.
    fn style(&self) -> Option<&PendingStyle> {
        None
    }

    /// Elements constructed from this element's children.
    fn children(&self) -> &[Box<dyn KmlElement>] {
        &[]
    }

    /// Drawable form of a geometry, given the properties of its owner.
    fn renderable(&self, _common: ShapeCommon) -> Option<Renderable> {
        None
    }

    /// Create or refresh this element's renderable in `layer`.
    fn update(&mut self, _layer: &mut dyn RenderLayer) -> Result<()> {
        tracing::trace!(tag = %self.tag_name(), "Element has nothing to render");
        Ok(())
    }

    fn as_any(&self) -> &dyn Any;
}

impl<'a> dyn KmlElement + 'a {
    /// Downcast to a concrete element type.
    pub fn downcast_ref<T: KmlElement + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }
}

/// Builds an element from a node.
pub trait ElementFactory: Send + Sync {
    /// # Errors
    /// Returns an error if the node cannot back this element type.
    fn create(&self, node: Arc<XmlNode>, context: ParseContext) -> Result<Box<dyn KmlElement>>;
}

impl<F> ElementFactory for F
where
    F: Fn(Arc<XmlNode>, ParseContext) -> Result<Box<dyn KmlElement>> + Send + Sync,
{
    fn create(&self, node: Arc<XmlNode>, context: ParseContext) -> Result<Box<dyn KmlElement>> {
        self(node, context)
    }
}

/// Node and context every element keeps.
#[derive(Debug, Clone)]
pub struct ElementBase {
    pub node: Arc<XmlNode>,
    pub context: ParseContext,
}

impl ElementBase {
    /// # Errors
    /// Returns `MissingNode` if `node` is not an element.
    pub fn new(node: Arc<XmlNode>, context: ParseContext, kind: &str) -> Result<Self> {
        if !node.is_element() {
            return Err(KmlError::MissingNode(kind.to_string()));
        }
        Ok(Self { node, context })
    }
}

/// Implements [`Retrieve`] for an element type holding an `ElementBase` in `base`.
macro_rules! impl_retrieve {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::registry::Retrieve for $ty {
                fn node(&self) -> &std::sync::Arc<$crate::xml::XmlNode> {
                    &self.base.node
                }
            }
        )+
    };
}

pub(crate) use impl_retrieve;
