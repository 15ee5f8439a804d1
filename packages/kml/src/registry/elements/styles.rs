//! Style selector elements: `<Style>`, `<StyleMap>`, `<Pair>`, `<PolyStyle>`, `<LineStyle>`.

use std::any::Any;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::Result;
use crate::registry::element::{impl_retrieve, ElementBase, KmlElement};
use crate::registry::{ParseContext, Query, Retrieve};
use crate::style::{LineStyle, Pair, PolyStyle, Style, StylePair};
use crate::xml::XmlNode;

#[derive(Debug)]
pub struct KmlStyle {
    base: ElementBase,
    children: Vec<Box<dyn KmlElement>>,
}

impl_retrieve!(KmlStyle);

impl KmlStyle {
    pub fn create(node: Arc<XmlNode>, context: ParseContext) -> Result<Box<dyn KmlElement>> {
        Ok(Box::new(Self::new(node, context)?))
    }

    /// # Errors
    /// Returns `MissingNode` if `node` is not an element.
    pub fn new(node: Arc<XmlNode>, context: ParseContext) -> Result<Self> {
        let base = ElementBase::new(node, context, "Style")?;
        let children = base.context.engine().parse(&base.node, &base.context);
        Ok(Self { base, children })
    }

    pub fn to_style(&self) -> Style {
        Style::from_node(self.node())
    }
}

impl KmlElement for KmlStyle {
    fn children(&self) -> &[Box<dyn KmlElement>] {
        &self.children
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct KmlPolyStyle {
    base: ElementBase,
}

impl_retrieve!(KmlPolyStyle);

impl KmlPolyStyle {
    pub fn create(node: Arc<XmlNode>, context: ParseContext) -> Result<Box<dyn KmlElement>> {
        Ok(Box::new(Self {
            base: ElementBase::new(node, context, "PolyStyle")?,
        }))
    }

    pub fn to_poly_style(&self) -> PolyStyle {
        PolyStyle::from_node(self.node())
    }
}

impl KmlElement for KmlPolyStyle {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct KmlLineStyle {
    base: ElementBase,
}

impl_retrieve!(KmlLineStyle);

impl KmlLineStyle {
    pub fn create(node: Arc<XmlNode>, context: ParseContext) -> Result<Box<dyn KmlElement>> {
        Ok(Box::new(Self {
            base: ElementBase::new(node, context, "LineStyle")?,
        }))
    }

    pub fn to_line_style(&self) -> LineStyle {
        LineStyle::from_node(self.node())
    }
}

impl KmlElement for KmlLineStyle {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A `<StyleMap>` and its `<Pair>` children.
#[derive(Debug)]
pub struct KmlStyleMap {
    base: ElementBase,
    pairs: Vec<Box<dyn KmlElement>>,
}

impl_retrieve!(KmlStyleMap);

impl KmlStyleMap {
    pub fn create(node: Arc<XmlNode>, context: ParseContext) -> Result<Box<dyn KmlElement>> {
        Ok(Box::new(Self::new(node, context)?))
    }

    /// # Errors
    /// Returns `MissingNode` if `node` is not an element.
    pub fn new(node: Arc<XmlNode>, context: ParseContext) -> Result<Self> {
        let base = ElementBase::new(node, context, "StyleMap")?;
        let pairs = base.context.engine().parse(&base.node, &base.context);
        Ok(Self { base, pairs })
    }

    /// Pairs in declaration order.
    pub fn pairs(&self) -> Vec<Pair> {
        self.pairs
            .iter()
            .filter_map(|element| element.downcast_ref::<KmlPair>())
            .map(KmlPair::to_pair)
            .collect()
    }

    /// Resolve every pair and merge the results by key.
    pub fn resolve(&self) -> BoxFuture<'static, StylePair> {
        self.base
            .context
            .resolver()
            .resolve_node(Arc::clone(self.node()))
    }
}

impl KmlElement for KmlStyleMap {
    fn children(&self) -> &[Box<dyn KmlElement>] {
        &self.pairs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct KmlPair {
    base: ElementBase,
}

impl_retrieve!(KmlPair);

impl KmlPair {
    pub fn create(node: Arc<XmlNode>, context: ParseContext) -> Result<Box<dyn KmlElement>> {
        Ok(Box::new(Self {
            base: ElementBase::new(node, context, "Pair")?,
        }))
    }

    pub fn key(&self) -> Option<String> {
        self.retrieve(&Query::child("key"))
    }

    pub fn style_url(&self) -> Option<String> {
        self.retrieve(&Query::child("styleUrl"))
    }

    pub fn to_pair(&self) -> Pair {
        Pair::from_node(self.node())
    }
}

impl KmlElement for KmlPair {
    fn as_any(&self) -> &dyn Any {
        self
    }
}
