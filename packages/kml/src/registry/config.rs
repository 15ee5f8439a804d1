//! Registry configuration for KML documents.

use std::sync::{Arc, LazyLock};

use super::core::ElementRegistry;
use super::elements::{
    KmlContainer, KmlLatLonBox, KmlLineString, KmlLineStyle, KmlLinearRing, KmlLookAt, KmlPair,
    KmlPlacemark, KmlPoint, KmlPolyStyle, KmlPolygon, KmlStyle, KmlStyleMap, KmlTimeStamp,
};

static DEFAULT_REGISTRY: LazyLock<Arc<ElementRegistry>> =
    LazyLock::new(|| Arc::new(create_kml_registry()));

/// Create a registry with every supported KML element.
#[must_use]
pub fn create_kml_registry() -> ElementRegistry {
    let mut registry = ElementRegistry::new();

    // Containers and features
    registry.register("Document", KmlContainer::create);
    registry.register("Folder", KmlContainer::create);
    registry.register("Placemark", KmlPlacemark::create);

    // Geometries
    registry.register("Point", KmlPoint::create);
    registry.register("LineString", KmlLineString::create);
    registry.register("LinearRing", KmlLinearRing::create);
    registry.register("Polygon", KmlPolygon::create);

    // Style selectors
    registry.register("Style", KmlStyle::create);
    registry.register("StyleMap", KmlStyleMap::create);
    registry.register("Pair", KmlPair::create);
    registry.register("PolyStyle", KmlPolyStyle::create);
    registry.register("LineStyle", KmlLineStyle::create);

    registry.register("TimeStamp", KmlTimeStamp::create);
    registry.register("LatLonBox", KmlLatLonBox::create);
    registry.register("LookAt", KmlLookAt::create);

    // Plain values read by their parent element
    registry.skip([
        "name",
        "description",
        "open",
        "visibility",
        "Snippet",
        "address",
        "phoneNumber",
        "styleUrl",
        "ExtendedData",
        "author",
        "link",
    ]);

    registry
}

/// Shared registry built on first use.
pub fn default_registry() -> Arc<ElementRegistry> {
    Arc::clone(&DEFAULT_REGISTRY)
}
