//! Style values and style selectors read from `Style`/`StyleMap` nodes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::registry::{to_f64, Query, Retrieve};
use crate::render::{Color, ColorMode, ShapeAttributes};
use crate::xml::{has_tag, XmlNode};

/// Interior style of polygons (`PolyStyle`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolyStyle {
    pub fill: Option<bool>,
    pub outline: Option<bool>,
    pub color: Option<Color>,
    pub color_mode: ColorMode,
}

impl PolyStyle {
    pub fn from_node(node: &Arc<XmlNode>) -> Self {
        Self {
            fill: node.retrieve_bool("fill"),
            outline: node.retrieve_bool("outline"),
            color: read_color(node),
            color_mode: read_color_mode(node),
        }
    }
}

/// Line style of outlines and paths (`LineStyle`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: Option<Color>,
    pub color_mode: ColorMode,
    pub width: Option<f64>,
}

impl LineStyle {
    pub fn from_node(node: &Arc<XmlNode>) -> Self {
        Self {
            color: read_color(node),
            color_mode: read_color_mode(node),
            width: node.retrieve_with(&Query::child("width"), to_f64).flatten(),
        }
    }
}

fn read_color(node: &Arc<XmlNode>) -> Option<Color> {
    node.retrieve(&Query::child("color"))
        .and_then(|value| Color::from_kml_hex(&value))
}

fn read_color_mode(node: &Arc<XmlNode>) -> ColorMode {
    node.retrieve_with(&Query::child("colorMode"), ColorMode::from_kml)
        .unwrap_or_default()
}

/// A concrete, self-contained style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub id: Option<String>,
    pub poly: Option<PolyStyle>,
    pub line: Option<LineStyle>,
}

impl Style {
    /// Read a style from a `<Style>` node.
    pub fn from_node(node: &Arc<XmlNode>) -> Self {
        Self {
            id: node.retrieve(&Query::attribute("id")),
            poly: node.retrieve_node(&["PolyStyle"]).map(PolyStyle::from_node),
            line: node.retrieve_node(&["LineStyle"]).map(LineStyle::from_node),
        }
    }

    /// Drawing attributes for shapes using this style.
    ///
    /// Interiors are filled unless `fill` is off. Outlines are drawn when
    /// `outline` is on, or when it is unset and a `LineStyle` is present.
    /// The outline colour prefers the line colour over the polygon colour.
    pub fn shape_attributes(&self) -> ShapeAttributes {
        let poly = self.poly.clone().unwrap_or_default();
        let line = self.line.as_ref();
        let defaults = ShapeAttributes::default();

        ShapeAttributes {
            draw_interior: poly.fill.unwrap_or(true),
            draw_outline: poly.outline.unwrap_or(line.is_some()),
            interior_color: poly.color.unwrap_or(defaults.interior_color),
            outline_color: line
                .and_then(|l| l.color)
                .or(poly.color)
                .unwrap_or(defaults.outline_color),
            outline_width: line
                .and_then(|l| l.width)
                .unwrap_or(defaults.outline_width),
            color_mode: poly.color_mode,
        }
    }
}

/// Resolved `{normal, highlight}` styles of an element.
///
/// Both fields are always present; `None` means no style for that state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StylePair {
    pub normal: Option<Arc<Style>>,
    pub highlight: Option<Arc<Style>>,
}

impl StylePair {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pair for a plain style: the style is the normal state.
    pub fn direct(style: Arc<Style>) -> Self {
        Self {
            normal: Some(style),
            highlight: None,
        }
    }

    /// Merge keyed results in order; a later entry for the same key wins.
    ///
    /// Only the `normal` and `highlight` keys are kept.
    pub fn from_keyed(results: impl IntoIterator<Item = (String, Option<Arc<Style>>)>) -> Self {
        let mut pair = Self::empty();
        for (key, style) in results {
            match key.as_str() {
                "normal" => pair.normal = style,
                "highlight" => pair.highlight = style,
                other => tracing::debug!(key = %other, "Ignoring unknown StyleMap key"),
            }
        }
        pair
    }

    pub fn normal_attributes(&self) -> ShapeAttributes {
        self.normal
            .as_ref()
            .map(|s| s.shape_attributes())
            .unwrap_or_default()
    }

    pub fn highlight_attributes(&self) -> Option<ShapeAttributes> {
        self.highlight.as_ref().map(|s| s.shape_attributes())
    }
}

/// Where a `Pair` (or an element) takes its style from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleReference {
    /// A `styleUrl` value such as `#id` or `other.kml#id`.
    Url(String),
    /// An inline `<Style>` or `<StyleMap>` node.
    Inline(Arc<XmlNode>),
}

impl StyleReference {
    /// Style reference of a node: an inline selector wins over `styleUrl`.
    pub fn from_node(node: &Arc<XmlNode>) -> Option<Self> {
        if let Some(inline) = node.retrieve_node(&["Style", "StyleMap"]) {
            return Some(Self::Inline(Arc::clone(inline)));
        }
        node.retrieve(&Query::child("styleUrl"))
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .map(Self::Url)
    }
}

/// One `key → style` entry of a `StyleMap`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub key: String,
    pub reference: Option<StyleReference>,
}

impl Pair {
    pub fn from_node(node: &Arc<XmlNode>) -> Self {
        Self {
            key: node
                .retrieve(&Query::child("key"))
                .map(|key| key.trim().to_string())
                .unwrap_or_default(),
            reference: StyleReference::from_node(node),
        }
    }
}

/// A `Style` or `StyleMap` read from its node.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleSelector {
    Style(Arc<Style>),
    Map(Vec<Pair>),
}

impl StyleSelector {
    /// Returns `None` if the node is neither `Style` nor `StyleMap`.
    pub fn from_node(node: &Arc<XmlNode>) -> Option<Self> {
        if has_tag(node, "Style") {
            Some(Self::Style(Arc::new(Style::from_node(node))))
        } else if has_tag(node, "StyleMap") {
            let pairs = node
                .retrieve_nodes(&["Pair"])
                .into_iter()
                .map(Pair::from_node)
                .collect();
            Some(Self::Map(pairs))
        } else {
            None
        }
    }
}
