//! End-to-end tests from markup to renderables.
//!
//! Uses a small document of parks in The Hague with shared styles,
//! style maps, nested folders and a few unsupported elements.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use kml_scene::registry::elements::{KmlContainer, KmlPlacemark, KmlTimeStamp};
use kml_scene::render::{Color, Renderable};
use kml_scene::{
    create_kml_registry, default_registry, KmlElement, KmlError, KmlFile, MemoryLayer, Query,
    Retrieve, Source,
};

fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn parks() -> KmlFile {
    KmlFile::from_markup(&load_fixture("parks.kml"), default_registry()).unwrap()
}

fn placemark<'a>(file: &'a KmlFile, id: &str) -> &'a KmlPlacemark {
    fn find<'a>(
        elements: &'a [Box<dyn KmlElement>],
        id: &str,
    ) -> Option<&'a KmlPlacemark> {
        elements.iter().find_map(|element| {
            element
                .downcast_ref::<KmlPlacemark>()
                .filter(|p| p.id().as_deref() == Some(id))
                .or_else(|| find(element.children(), id))
        })
    }
    find(file.shapes(), id).unwrap_or_else(|| panic!("no placemark {id}"))
}

#[test]
fn test_single_placemark_document() {
    let file = KmlFile::from_markup(r#"<kml><Placemark id="p1"/></kml>"#, default_registry()).unwrap();
    assert_eq!(file.shapes().len(), 1);
    assert_eq!(
        file.shapes()[0].retrieve(&Query::attribute("id")),
        Some("p1".to_string())
    );
}

#[test]
fn test_shapes_follow_document_order() {
    let file = KmlFile::from_markup(
        "<kml><Folder id=\"a\"/><Placemark id=\"b\"/><Document id=\"c\"/><Placemark id=\"d\"/></kml>",
        Arc::new(create_kml_registry()),
    )
    .unwrap();
    let ids: Vec<_> = file.shapes().iter().filter_map(|s| s.id()).collect();
    assert_eq!(ids, vec!["a", "b", "c", "d"]);
}

#[test]
fn test_unknown_elements_are_skipped() {
    let file = KmlFile::from_markup(
        "<kml><NetworkLink/><Placemark/><ScreenOverlay/><Placemark/><Model/></kml>",
        default_registry(),
    )
    .unwrap();
    assert_eq!(file.shapes().len(), 2);
}

#[test]
fn test_parks_structure() {
    let file = parks();
    assert_eq!(file.shapes().len(), 1);

    let document = file.shapes()[0].downcast_ref::<KmlContainer>().unwrap();
    assert_eq!(document.name().as_deref(), Some("Parks of The Hague"));
    assert!(document.open());

    let tags: Vec<_> = document.children().iter().map(|c| c.tag_name()).collect();
    assert_eq!(
        tags,
        vec!["Style", "Style", "StyleMap", "StyleMap", "Folder", "Placemark"]
    );

    let folder = &document.children()[4];
    assert_eq!(folder.children().len(), 2);

    let mut ids: Vec<_> = file.styles().ids().collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["hover-only", "park", "park-hover", "park-normal"]);
}

#[test]
fn test_time_stamp_of_placemark() {
    let file = parks();
    let park = placemark(&file, "westbroekpark");
    let stamp = park
        .children()
        .iter()
        .find_map(|c| c.downcast_ref::<KmlTimeStamp>())
        .unwrap();
    assert_eq!(stamp.when().as_deref(), Some("2021-06-01"));
    assert_eq!(
        stamp.when_parsed().unwrap().to_rfc3339(),
        "2021-06-01T00:00:00+00:00"
    );
}

#[tokio::test]
async fn test_resolved_styles_reach_renderables() {
    let mut file = parks();
    file.resolve_styles().await;

    let mut layer = MemoryLayer::new();
    file.update(Some(&mut layer)).unwrap();
    assert_eq!(layer.len(), 3);

    let by_name = |name: &str| {
        layer
            .renderables()
            .find(|r| r.common().display_name.as_deref() == Some(name))
            .cloned()
            .unwrap()
    };

    let Renderable::Polygon(park) = by_name("Westbroekpark") else {
        panic!("expected a polygon");
    };
    assert_eq!(park.outer_boundary.len(), 5);
    assert_eq!(park.common.attributes.interior_color, Color::rgba(0, 255, 0, 127));
    assert!(park.common.attributes.draw_outline);
    assert_eq!(park.common.attributes.outline_width, 2.0);
    let highlight = park.common.highlight_attributes.unwrap();
    assert_eq!(highlight.interior_color, Color::rgba(0, 255, 0, 255));

    let Renderable::Placemark(woods) = by_name("Scheveningse Bosjes") else {
        panic!("expected a placemark");
    };
    assert_eq!(woods.common.attributes, Default::default());
    assert!(woods.common.highlight_attributes.is_some());

    let Renderable::Path(boulevard) = by_name("Boulevard") else {
        panic!("expected a path");
    };
    assert!(!boulevard.common.enabled);
    assert!(boulevard.tessellate);
    assert_eq!(boulevard.positions.len(), 3);
}

#[tokio::test]
async fn test_update_is_idempotent_across_frames() {
    let mut file = parks();
    file.resolve_styles().await;
    let mut layer = MemoryLayer::new();

    for _ in 0..5 {
        file.update(Some(&mut layer)).unwrap();
    }
    assert_eq!(layer.len(), 3);
    assert_eq!(layer.refresh_count(), 12);

    let park = placemark(&file, "westbroekpark");
    assert!(layer.get(park.renderable_id().unwrap()).is_some());
}

#[test]
fn test_local_styles_apply_without_awaiting() {
    let mut file = KmlFile::from_markup(
        r##"<kml><Document>
            <Style id="red"><PolyStyle><color>ff0000ff</color></PolyStyle></Style>
            <Placemark><styleUrl>#red</styleUrl>
                <Polygon><outerBoundaryIs><LinearRing>
                    <coordinates>4.30,52.08 4.31,52.08 4.31,52.09 4.30,52.08</coordinates>
                </LinearRing></outerBoundaryIs></Polygon></Placemark>
        </Document></kml>"##,
        default_registry(),
    )
    .unwrap();
    let mut layer = MemoryLayer::new();

    for _ in 0..3 {
        file.update(Some(&mut layer)).unwrap();
    }

    assert_eq!(layer.len(), 1);
    let drawn = layer.renderables().next().unwrap();
    assert_eq!(
        drawn.common().attributes.interior_color,
        Color::rgba(255, 0, 0, 255)
    );
}

#[test]
fn test_update_without_layer_leaves_layer_state_alone() {
    let mut file = parks();
    let mut layer = MemoryLayer::new();
    file.update(Some(&mut layer)).unwrap();

    assert!(matches!(file.update(None), Err(KmlError::MissingLayer)));

    file.update(Some(&mut layer)).unwrap();
    assert_eq!(layer.len(), 3);
}

#[tokio::test]
async fn test_open_inline_source() {
    struct NoFetch;

    #[async_trait::async_trait]
    impl kml_scene::Fetcher for NoFetch {
        async fn fetch(&self, url: &str) -> kml_scene::Result<Vec<u8>> {
            Err(KmlError::UnsupportedSource(url.to_string()))
        }
    }

    let file = KmlFile::open(
        Source::Inline(load_fixture("parks.kml")),
        Arc::new(NoFetch),
        default_registry(),
    )
    .await
    .unwrap();

    let park = placemark(&file, "westbroekpark");
    assert!(park.shape_common().highlight_attributes.is_some());
}
