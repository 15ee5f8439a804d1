//! `<LatLonBox>` and `<LookAt>` elements.

use std::any::Any;
use std::sync::Arc;

use crate::error::Result;
use crate::registry::element::{impl_retrieve, ElementBase, KmlElement};
use crate::registry::{ParseContext, Query, Retrieve};
use crate::render::AltitudeMode;
use crate::xml::XmlNode;

/// Bounding box of a ground overlay, in degrees.
#[derive(Debug)]
pub struct KmlLatLonBox {
    base: ElementBase,
}

impl_retrieve!(KmlLatLonBox);

impl KmlLatLonBox {
    pub fn create(node: Arc<XmlNode>, context: ParseContext) -> Result<Box<dyn KmlElement>> {
        Ok(Box::new(Self {
            base: ElementBase::new(node, context, "LatLonBox")?,
        }))
    }

    pub fn north(&self) -> Option<f64> {
        self.retrieve_f64("north")
    }

    pub fn south(&self) -> Option<f64> {
        self.retrieve_f64("south")
    }

    pub fn east(&self) -> Option<f64> {
        self.retrieve_f64("east")
    }

    pub fn west(&self) -> Option<f64> {
        self.retrieve_f64("west")
    }

    /// Rotation in degrees; `0` when absent.
    pub fn rotation(&self) -> f64 {
        self.retrieve_f64("rotation").unwrap_or(0.0)
    }
}

impl KmlElement for KmlLatLonBox {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Virtual camera looking at a point.
#[derive(Debug)]
pub struct KmlLookAt {
    base: ElementBase,
}

impl_retrieve!(KmlLookAt);

impl KmlLookAt {
    pub fn create(node: Arc<XmlNode>, context: ParseContext) -> Result<Box<dyn KmlElement>> {
        Ok(Box::new(Self {
            base: ElementBase::new(node, context, "LookAt")?,
        }))
    }

    pub fn longitude(&self) -> Option<f64> {
        self.retrieve_f64("longitude")
    }

    pub fn latitude(&self) -> Option<f64> {
        self.retrieve_f64("latitude")
    }

    pub fn altitude(&self) -> Option<f64> {
        self.retrieve_f64("altitude")
    }

    pub fn heading(&self) -> Option<f64> {
        self.retrieve_f64("heading")
    }

    pub fn tilt(&self) -> Option<f64> {
        self.retrieve_f64("tilt")
    }

    pub fn range(&self) -> Option<f64> {
        self.retrieve_f64("range")
    }

    pub fn altitude_mode(&self) -> AltitudeMode {
        self.retrieve_with(&Query::child("altitudeMode"), AltitudeMode::from_kml)
            .unwrap_or_default()
    }
}

impl KmlElement for KmlLookAt {
    fn as_any(&self) -> &dyn Any {
        self
    }
}
