//! Style resolution through the public API.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use kml_scene::registry::elements::{KmlPlacemark, KmlStyleMap};
use kml_scene::style::{StyleIndex, StyleReference};
use kml_scene::xml::parse_document;
use kml_scene::{default_registry, KmlElement, KmlFile, StylePair, StyleResolver};

const STYLES: &str = r##"<kml><Document>
    <Style id="s1"><PolyStyle><color>ff0000ff</color></PolyStyle></Style>
    <Style id="s2"><LineStyle><width>6</width></LineStyle></Style>
    <StyleMap id="highlight-only">
        <Pair><key>highlight</key><styleUrl>#s1</styleUrl></Pair>
    </StyleMap>
    <StyleMap id="repeated">
        <Pair><key>normal</key><styleUrl>#s1</styleUrl></Pair>
        <Pair><key>normal</key><styleUrl>#s2</styleUrl></Pair>
    </StyleMap>
    <StyleMap id="odd-keys">
        <Pair><key>selected</key><styleUrl>#s1</styleUrl></Pair>
        <Pair><key>normal</key></Pair>
    </StyleMap>
</Document></kml>"##;

fn resolver() -> Arc<StyleResolver> {
    let root = parse_document(STYLES).unwrap();
    Arc::new(StyleResolver::new(StyleIndex::build(&root)))
}

fn id(pair: &StylePair, highlight: bool) -> Option<String> {
    let style = if highlight { &pair.highlight } else { &pair.normal };
    style.as_ref().and_then(|s| s.id.clone())
}

#[tokio::test]
async fn test_highlight_only_style_map() {
    let pair = resolver().resolve_url("#highlight-only").await;
    assert_eq!(id(&pair, false), None);
    assert_eq!(id(&pair, true), Some("s1".to_string()));
}

#[tokio::test]
async fn test_last_pair_for_key_wins() {
    let pair = resolver().resolve_url("#repeated").await;
    assert_eq!(id(&pair, false), Some("s2".to_string()));
    assert_eq!(id(&pair, true), None);
}

#[tokio::test]
async fn test_unknown_keys_and_empty_pairs() {
    let pair = resolver().resolve_url("#odd-keys").await;
    assert_eq!(pair, StylePair::empty());
}

#[tokio::test]
async fn test_inline_style_map_reference() {
    let root = parse_document(
        "<kml><StyleMap><Pair><key>normal</key><Style id=\"inline\"/></Pair></StyleMap></kml>",
    )
    .unwrap();
    let map = Arc::clone(root.element_children().next().unwrap());

    let pair = resolver().pending(StyleReference::Inline(map)).wait().await;
    assert_eq!(id(&pair, false), Some("inline".to_string()));
}

#[tokio::test]
async fn test_placemarks_share_inherited_style() {
    let file = KmlFile::from_markup(
        r##"<kml><Document>
            <Style id="s1"/>
            <Placemark id="styled"><styleUrl>#s1</styleUrl></Placemark>
            <Placemark id="plain"/>
            <StyleMap id="map"><Pair><key>normal</key><styleUrl>#s1</styleUrl></Pair></StyleMap>
        </Document></kml>"##,
        default_registry(),
    )
    .unwrap();
    file.resolve_styles().await;

    let document = &file.shapes()[0];
    let placemark = |index: usize| {
        document.children()[index]
            .downcast_ref::<KmlPlacemark>()
            .unwrap()
    };
    assert_eq!(
        id(&placemark(1).style().unwrap().current(), false),
        Some("s1".to_string())
    );
    assert_eq!(placemark(2).style().unwrap().current(), StylePair::empty());

    let map = document.children()[3].downcast_ref::<KmlStyleMap>().unwrap();
    assert_eq!(id(&map.resolve().await, false), Some("s1".to_string()));
}
