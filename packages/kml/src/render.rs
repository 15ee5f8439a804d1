//! Values exchanged with the host render layer.
//!
//! Elements never draw anything themselves. During `update` they build a
//! [`Renderable`] from their node and resolved style and hand it to a
//! [`RenderLayer`] supplied by the host viewer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// RGBA colour with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Parse a KML colour (`aabbggrr`, optionally prefixed with `#`).
    ///
    /// # Examples
    /// ```
    /// use kml_scene::render::Color;
    ///
    /// let green = Color::from_kml_hex("7f00ff00").unwrap();
    /// assert_eq!(green, Color::rgba(0, 255, 0, 127));
    /// assert!(Color::from_kml_hex("red").is_none());
    /// ```
    pub fn from_kml_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 8 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self {
            alpha: channel(0)?,
            blue: channel(2)?,
            green: channel(4)?,
            red: channel(6)?,
        })
    }
}

/// How a colour is applied: as given, or randomised by the viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorMode {
    #[default]
    Normal,
    Random,
}

impl ColorMode {
    /// Parse a `colorMode` value; unknown values fall back to `Normal`.
    pub fn from_kml(value: &str) -> Self {
        match value.trim() {
            "random" => Self::Random,
            _ => Self::Normal,
        }
    }
}

/// Interpretation of the altitude component of positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AltitudeMode {
    #[default]
    ClampToGround,
    RelativeToGround,
    Absolute,
    ClampToSeaFloor,
    RelativeToSeaFloor,
}

impl AltitudeMode {
    /// Parse an `altitudeMode` value (including the `gx:` sea floor variants).
    pub fn from_kml(value: &str) -> Self {
        match value.trim() {
            "relativeToGround" => Self::RelativeToGround,
            "absolute" => Self::Absolute,
            "clampToSeaFloor" => Self::ClampToSeaFloor,
            "relativeToSeaFloor" => Self::RelativeToSeaFloor,
            _ => Self::ClampToGround,
        }
    }
}

/// Geographic position in degrees, altitude in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }
}

/// Drawing attributes of a shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeAttributes {
    pub draw_interior: bool,
    pub draw_outline: bool,
    pub interior_color: Color,
    pub outline_color: Color,
    pub outline_width: f64,
    pub color_mode: ColorMode,
}

impl Default for ShapeAttributes {
    fn default() -> Self {
        Self {
            draw_interior: true,
            draw_outline: false,
            interior_color: Color::WHITE,
            outline_color: Color::WHITE,
            outline_width: 1.0,
            color_mode: ColorMode::Normal,
        }
    }
}

/// Properties every renderable carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeCommon {
    pub display_name: Option<String>,
    pub enabled: bool,
    pub attributes: ShapeAttributes,
    pub highlight_attributes: Option<ShapeAttributes>,
    pub altitude_mode: AltitudeMode,
}

/// A point marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacemarkShape {
    pub common: ShapeCommon,
    pub position: Position,
}

/// A polygon with one outer and any number of inner boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonShape {
    pub common: ShapeCommon,
    pub outer_boundary: Vec<Position>,
    pub inner_boundaries: Vec<Vec<Position>>,
    pub extrude: bool,
}

/// An open or closed line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathShape {
    pub common: ShapeCommon,
    pub positions: Vec<Position>,
    pub extrude: bool,
    pub tessellate: bool,
}

/// A drawable value handed to the host render layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Renderable {
    Placemark(PlacemarkShape),
    Polygon(PolygonShape),
    Path(PathShape),
}

impl Renderable {
    pub fn common(&self) -> &ShapeCommon {
        match self {
            Self::Placemark(shape) => &shape.common,
            Self::Polygon(shape) => &shape.common,
            Self::Path(shape) => &shape.common,
        }
    }
}

/// Handle of a renderable inside a render layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RenderableId(pub u64);

/// Host layer receiving renderables from elements during `update`.
pub trait RenderLayer {
    /// Add a new renderable and return its handle.
    fn add_renderable(&mut self, renderable: Renderable) -> RenderableId;

    /// Replace the renderable behind `id`.
    ///
    /// Returns `false` if the layer does not know `id`; the caller then adds
    /// the renderable instead.
    fn refresh_renderable(&mut self, id: RenderableId, renderable: Renderable) -> bool;
}

/// Render layer that keeps renderables in memory.
///
/// Useful for headless hosts and for inspecting what a document produces.
#[derive(Debug, Default)]
pub struct MemoryLayer {
    next_id: u64,
    renderables: BTreeMap<RenderableId, Renderable>,
    refreshes: usize,
}

impl MemoryLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.renderables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderables.is_empty()
    }

    pub fn get(&self, id: RenderableId) -> Option<&Renderable> {
        self.renderables.get(&id)
    }

    /// Renderables in insertion order.
    pub fn renderables(&self) -> impl Iterator<Item = &Renderable> {
        self.renderables.values()
    }

    /// Number of successful refreshes so far.
    pub fn refresh_count(&self) -> usize {
        self.refreshes
    }

    pub fn remove(&mut self, id: RenderableId) -> Option<Renderable> {
        self.renderables.remove(&id)
    }
}

impl RenderLayer for MemoryLayer {
    fn add_renderable(&mut self, renderable: Renderable) -> RenderableId {
        self.next_id += 1;
        let id = RenderableId(self.next_id);
        self.renderables.insert(id, renderable);
        id
    }

    fn refresh_renderable(&mut self, id: RenderableId, renderable: Renderable) -> bool {
        match self.renderables.get_mut(&id) {
            Some(slot) => {
                *slot = renderable;
                self.refreshes += 1;
                true
            }
            None => false,
        }
    }
}
