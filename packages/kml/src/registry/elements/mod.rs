//! Element types for the registered KML tags.

mod container;
mod geometry;
mod placemark;
mod styles;
mod time;
mod view;

pub use container::KmlContainer;
pub use geometry::{parse_coordinates, KmlLineString, KmlLinearRing, KmlPoint, KmlPolygon};
pub use placemark::KmlPlacemark;
pub use styles::{KmlLineStyle, KmlPair, KmlPolyStyle, KmlStyle, KmlStyleMap};
pub use time::KmlTimeStamp;
pub use view::{KmlLatLonBox, KmlLookAt};
