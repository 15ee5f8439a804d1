//! Geometry elements: `<Point>`, `<LineString>`, `<LinearRing>`, `<Polygon>`.
//!
//! Geometries draw nothing on their own. Their owning placemark passes in
//! its name, visibility and style, and the geometry turns that into a
//! [`Renderable`].

use std::any::Any;
use std::sync::Arc;

use crate::error::Result;
use crate::registry::element::{impl_retrieve, ElementBase, KmlElement};
use crate::registry::{ParseContext, Query, Retrieve};
use crate::render::{
    AltitudeMode, PathShape, PlacemarkShape, PolygonShape, Position, Renderable, ShapeCommon,
};
use crate::xml::{get_text, XmlNode};

/// Parse a KML `coordinates` value: whitespace-separated `lon,lat[,alt]` tuples.
///
/// Malformed tuples are skipped.
///
/// # Examples
/// ```
/// use kml_scene::registry::elements::parse_coordinates;
///
/// let positions = parse_coordinates("4.3,52.0,10  5.1,52.1\n bad");
/// assert_eq!(positions.len(), 2);
/// assert_eq!(positions[0].longitude, 4.3);
/// assert_eq!(positions[0].altitude, 10.0);
/// assert_eq!(positions[1].altitude, 0.0);
/// ```
pub fn parse_coordinates(text: &str) -> Vec<Position> {
    text.split_whitespace()
        .filter_map(|tuple| {
            let position = parse_tuple(tuple);
            if position.is_none() {
                tracing::warn!(tuple = %tuple, "Skipping malformed coordinate tuple");
            }
            position
        })
        .collect()
}

fn parse_tuple(tuple: &str) -> Option<Position> {
    let values = tuple
        .split(',')
        .map(|v| v.trim().parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()?;
    match values.as_slice() {
        [longitude, latitude] => Some(Position::new(*latitude, *longitude, 0.0)),
        [longitude, latitude, altitude] => Some(Position::new(*latitude, *longitude, *altitude)),
        _ => None,
    }
}

fn coordinates_of(node: &Arc<XmlNode>) -> Vec<Position> {
    node.retrieve_node(&["coordinates"])
        .map(|c| parse_coordinates(&get_text(c)))
        .unwrap_or_default()
}

fn altitude_mode_of(node: &Arc<XmlNode>) -> AltitudeMode {
    node.retrieve(&Query::child("altitudeMode"))
        .map(|v| AltitudeMode::from_kml(&v))
        .unwrap_or_default()
}

macro_rules! geometry_element {
    ($name:ident, $kind:literal) => {
        impl $name {
            pub fn create(node: Arc<XmlNode>, context: ParseContext) -> Result<Box<dyn KmlElement>> {
                Ok(Box::new(Self::new(node, context)?))
            }

            /// # Errors
            /// Returns `MissingNode` if `node` is not an element.
            pub fn new(node: Arc<XmlNode>, context: ParseContext) -> Result<Self> {
                Ok(Self {
                    base: ElementBase::new(node, context, $kind)?,
                })
            }

            pub fn altitude_mode(&self) -> AltitudeMode {
                altitude_mode_of(self.node())
            }

            pub fn extrude(&self) -> bool {
                self.retrieve_bool("extrude").unwrap_or(false)
            }
        }

        impl_retrieve!($name);
    };
}

#[derive(Debug)]
pub struct KmlPoint {
    base: ElementBase,
}

geometry_element!(KmlPoint, "Point");

impl KmlPoint {
    /// The first coordinate tuple.
    pub fn position(&self) -> Option<Position> {
        coordinates_of(self.node()).into_iter().next()
    }
}

impl KmlElement for KmlPoint {
    fn renderable(&self, mut common: ShapeCommon) -> Option<Renderable> {
        let position = self.position()?;
        common.altitude_mode = self.altitude_mode();
        Some(Renderable::Placemark(PlacemarkShape { common, position }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct KmlLineString {
    base: ElementBase,
}

geometry_element!(KmlLineString, "LineString");

impl KmlLineString {
    pub fn positions(&self) -> Vec<Position> {
        coordinates_of(self.node())
    }

    pub fn tessellate(&self) -> bool {
        self.retrieve_bool("tessellate").unwrap_or(false)
    }
}

impl KmlElement for KmlLineString {
    fn renderable(&self, mut common: ShapeCommon) -> Option<Renderable> {
        let positions = self.positions();
        if positions.is_empty() {
            return None;
        }
        common.altitude_mode = self.altitude_mode();
        Some(Renderable::Path(PathShape {
            common,
            positions,
            extrude: self.extrude(),
            tessellate: self.tessellate(),
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A closed line; drawn as a path whose last position repeats the first.
#[derive(Debug)]
pub struct KmlLinearRing {
    base: ElementBase,
}

geometry_element!(KmlLinearRing, "LinearRing");

impl KmlLinearRing {
    pub fn positions(&self) -> Vec<Position> {
        close_ring(coordinates_of(self.node()))
    }

    pub fn tessellate(&self) -> bool {
        self.retrieve_bool("tessellate").unwrap_or(false)
    }
}

fn close_ring(mut positions: Vec<Position>) -> Vec<Position> {
    if let (Some(first), Some(last)) = (positions.first().copied(), positions.last()) {
        if first != *last {
            positions.push(first);
        }
    }
    positions
}

impl KmlElement for KmlLinearRing {
    fn renderable(&self, mut common: ShapeCommon) -> Option<Renderable> {
        let positions = self.positions();
        if positions.is_empty() {
            return None;
        }
        common.altitude_mode = self.altitude_mode();
        Some(Renderable::Path(PathShape {
            common,
            positions,
            extrude: self.extrude(),
            tessellate: self.tessellate(),
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct KmlPolygon {
    base: ElementBase,
}

geometry_element!(KmlPolygon, "Polygon");

impl KmlPolygon {
    pub fn outer_boundary(&self) -> Vec<Position> {
        self.retrieve_node(&["outerBoundaryIs"])
            .and_then(|boundary| boundary.retrieve_node(&["LinearRing"]))
            .map(|ring| close_ring(coordinates_of(ring)))
            .unwrap_or_default()
    }

    pub fn inner_boundaries(&self) -> Vec<Vec<Position>> {
        self.retrieve_nodes(&["innerBoundaryIs"])
            .into_iter()
            .filter_map(|boundary| boundary.retrieve_node(&["LinearRing"]))
            .map(|ring| close_ring(coordinates_of(ring)))
            .filter(|ring| !ring.is_empty())
            .collect()
    }
}

impl KmlElement for KmlPolygon {
    fn renderable(&self, mut common: ShapeCommon) -> Option<Renderable> {
        let outer_boundary = self.outer_boundary();
        if outer_boundary.is_empty() {
            tracing::debug!(id = ?self.id(), "Polygon without outer boundary, not drawn");
            return None;
        }
        common.altitude_mode = self.altitude_mode();
        Some(Renderable::Polygon(PolygonShape {
            common,
            outer_boundary,
            inner_boundaries: self.inner_boundaries(),
            extrude: self.extrude(),
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
