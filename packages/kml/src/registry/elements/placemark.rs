//! `<Placemark>` element.

use std::any::Any;
use std::sync::Arc;

use crate::error::Result;
use crate::registry::element::{impl_retrieve, ElementBase, KmlElement};
use crate::registry::{ParseContext, Query, Retrieve};
use crate::render::{AltitudeMode, RenderLayer, Renderable, RenderableId, ShapeCommon};
use crate::style::{PendingStyle, StyleReference};
use crate::xml::XmlNode;

const GEOMETRY_TAGS: &[&str] = &["Point", "LineString", "LinearRing", "Polygon"];

/// A feature with one geometry, drawn with its resolved style.
///
/// The style comes from an inline `Style`/`StyleMap` child, else from
/// `styleUrl`, else from the enclosing container.
#[derive(Debug)]
pub struct KmlPlacemark {
    base: ElementBase,
    style: PendingStyle,
    children: Vec<Box<dyn KmlElement>>,
    geometry: Option<usize>,
    renderable_id: Option<RenderableId>,
}

impl_retrieve!(KmlPlacemark);

impl KmlPlacemark {
    pub fn create(node: Arc<XmlNode>, context: ParseContext) -> Result<Box<dyn KmlElement>> {
        Ok(Box::new(Self::new(node, context)?))
    }

    /// # Errors
    /// Returns `MissingNode` if `node` is not an element, or the geometry's
    /// construction error.
    pub fn new(node: Arc<XmlNode>, context: ParseContext) -> Result<Self> {
        let style = match StyleReference::from_node(&node) {
            Some(reference) => context.resolver().pending(reference),
            None => context.style().clone(),
        };
        let base = ElementBase::new(node, context.with_style(style.clone()), "Placemark")?;

        let mut children = Vec::new();
        let mut geometry = None;
        if let Some(element) = base.node.create_child_element(GEOMETRY_TAGS, &base.context)? {
            geometry = Some(children.len());
            children.push(element);
        }
        for names in [&["TimeStamp"][..], &["LookAt"][..]] {
            if let Some(element) = base.node.create_child_element(names, &base.context)? {
                children.push(element);
            }
        }

        Ok(Self {
            base,
            style,
            children,
            geometry,
            renderable_id: None,
        })
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

    pub fn geometry(&self) -> Option<&dyn KmlElement> {
        self.geometry.map(|index| self.children[index].as_ref())
    }

    /// Handle of the renderable produced by the last update.
    pub fn renderable_id(&self) -> Option<RenderableId> {
        self.renderable_id
    }

    /// Name, visibility and style as currently resolved.
    pub fn shape_common(&self) -> ShapeCommon {
        let pair = self.style.current();
        ShapeCommon {
            display_name: self.name(),
            enabled: self.visibility(),
            attributes: pair.normal_attributes(),
            highlight_attributes: pair.highlight_attributes(),
            altitude_mode: AltitudeMode::default(),
        }
    }
}

impl KmlElement for KmlPlacemark {
    fn style(&self) -> Option<&PendingStyle> {
        Some(&self.style)
    }

    fn children(&self) -> &[Box<dyn KmlElement>] {
        &self.children
    }

    fn renderable(&self, common: ShapeCommon) -> Option<Renderable> {
        self.geometry()?.renderable(common)
    }

    fn update(&mut self, layer: &mut dyn RenderLayer) -> Result<()> {
        let Some(renderable) = self.renderable(self.shape_common()) else {
            tracing::trace!(id = ?self.id(), "Placemark has no drawable geometry");
            return Ok(());
        };

        let id = match self.renderable_id {
            Some(id) if layer.refresh_renderable(id, renderable.clone()) => id,
            _ => layer.add_renderable(renderable),
        };
        self.renderable_id = Some(id);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
