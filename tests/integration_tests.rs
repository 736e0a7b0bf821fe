use geomap::prelude::*;
use std::sync::Arc;

/// Integration tests for the widget lifecycle as a host page drives it:
/// initialize, wait for the overlay, then click and type around.
#[cfg(test)]
mod integration_tests {
    use super::*;
    use geomap::ui::panel::PanelBody;

    const SITES_URL: &str = "https://example.test/sites.geojson";

    const SITES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature",
              "geometry": { "type": "Point", "coordinates": [-75.6972, 45.4215] },
              "properties": { "name": "Ottawa", "units": 412, "tenure": "rental" } },
            { "type": "Feature",
              "geometry": { "type": "Point", "coordinates": [-79.3832, 43.6532] },
              "properties": { "name": "Toronto", "units": 1280 } },
            { "type": "Feature",
              "geometry": { "type": "Point", "coordinates": [-123.1207, 49.2827] },
              "properties": {} },
            { "type": "Feature",
              "geometry": { "type": "LineString", "coordinates": [[-75.7, 45.4], [-79.4, 43.7]] },
              "properties": { "name": "Corridor" } }
        ]
    }"#;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn sites_config(extra_map: &str) -> PartialMapConfig {
        let json = format!(
            r#"{{
                "language": "en",
                "map": {{ {} }},
                "layers": [ {{ "id": "sites", "config": {{
                    "url": "{}",
                    "customMarkerIcon": {{ "point": "icons/pin.svg" }}
                }} }} ]
            }}"#,
            extra_map, SITES_URL
        );
        PartialMapConfig::from_json(&json).unwrap()
    }

    /// Initializes a map over a headless surface and waits for the overlay
    async fn loaded_map(
        config: PartialMapConfig,
        source: StaticFeatureSource,
    ) -> (MapController, Arc<HeadlessSurface>) {
        init_logging();
        let surface = Arc::new(HeadlessSurface::new());
        let map = MapBuilder::new("map")
            .with_config(config)
            .with_surface(surface.clone())
            .with_feature_source(Arc::new(source))
            .build()
            .unwrap();
        while map.is_loading() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        (map, surface)
    }

    fn ids(layers: &[BasemapLayerDescriptor]) -> Vec<(&str, f32)> {
        layers.iter().map(|l| (l.id.as_str(), l.opacity)).collect()
    }

    /// Shaded main basemap in EPSG:3978 is drawn twice: once as the
    /// hillshade underlay and once as the main layer
    #[tokio::test]
    async fn test_lcc_shaded_basemap_is_not_deduplicated() {
        let config = PartialMapConfig::from_json(
            r#"{ "language": "en",
                 "map": { "projection": 3978,
                          "basemap": { "id": "shaded", "shaded": true, "labeled": true } } }"#,
        )
        .unwrap();
        let (map, surface) = loaded_map(config, StaticFeatureSource::new()).await;

        assert_eq!(map.projection().epsg, 3978);
        assert_eq!(map.projection().resolutions.len(), 20);
        assert_eq!(
            ids(map.basemaps()),
            [("shaded", 1.0), ("shaded", 0.75), ("label", 1.0)]
        );
        assert!(map.basemaps()[2].url.contains("CBMT"));
        assert_eq!(surface.tile_layers(), map.basemaps());
        assert!(surface
            .tile_layers()
            .iter()
            .all(|l| l.pane_name == "basemapsPane"));
    }

    /// French labels use the French tile set
    #[tokio::test]
    async fn test_french_labels() {
        let config = PartialMapConfig::from_json(
            r#"{ "language": "fr",
                 "map": { "basemap": { "id": "simple", "shaded": true, "labeled": true } } }"#,
        )
        .unwrap();
        let (map, _) = loaded_map(config, StaticFeatureSource::new()).await;

        assert_eq!(
            ids(map.basemaps()),
            [("shaded", 1.0), ("simple", 0.75), ("label", 1.0)]
        );
        assert!(map.basemaps()[2].url.contains("CBCT"));
    }

    /// Unknown projections fall back to web mercator, with that catalog
    #[tokio::test]
    async fn test_unknown_projection_degrades() {
        let (map, surface) =
            loaded_map(sites_config(r#""projection": 4326"#), StaticFeatureSource::new()).await;

        assert_eq!(*map.projection(), ProjectionProvider::projection_for(3857));
        assert_eq!(surface.options().unwrap().crs.epsg, 3857);
        assert_eq!(ids(map.basemaps()), [("osm", 1.0), ("label", 1.0)]);
    }

    /// The overlay builds one marker per point and a shape per line
    #[tokio::test]
    async fn test_overlay_loads_markers() {
        let source = StaticFeatureSource::new().with_document(SITES_URL, SITES);
        let (_map, surface) = loaded_map(sites_config(""), source).await;

        let markers = surface.markers();
        assert_eq!(markers.len(), 3);
        assert_eq!(surface.shapes().len(), 1);

        let tooltips: Vec<&str> = markers.iter().map(|m| m.tooltip()).collect();
        assert_eq!(tooltips, ["Ottawa", "Toronto", "Item"]);
        assert_eq!(markers[0].icon().url.as_deref(), Some("icons/pin.svg"));
    }

    /// A failed fetch leaves the rest of the widget working
    #[tokio::test]
    async fn test_fetch_failure_is_not_fatal() {
        let (map, surface) = loaded_map(sites_config(""), StaticFeatureSource::new()).await;

        assert!(surface.markers().is_empty());
        assert_eq!(map.basemaps().len(), 2);
        map.panel().open();
        assert_eq!(map.panel().state(), PanelState::Open);
    }

    /// Click A, then Enter on B: A is cleared before B is highlighted
    #[tokio::test]
    async fn test_marker_selection_protocol() {
        let source = StaticFeatureSource::new().with_document(SITES_URL, SITES);
        let (map, surface) = loaded_map(sites_config(""), source).await;
        let markers = surface.markers();
        let (a, b) = (markers[0].id(), markers[1].id());

        map.handle_marker_event(a, &InputEvent::click());
        map.handle_marker_event(b, &InputEvent::key(KeyCode::Enter));

        let highlighted: Vec<MarkerId> = markers
            .iter()
            .map(|m| m.id())
            .filter(|id| surface.is_highlighted(*id))
            .collect();
        assert_eq!(highlighted, [b]);

        let log = surface.style_log();
        let clear_a = log
            .iter()
            .position(|entry| *entry == (a, MarkerStyle::cleared()))
            .unwrap();
        let highlight_b = log
            .iter()
            .position(|entry| *entry == (b, MarkerStyle::highlighted()))
            .unwrap();
        assert!(clear_a < highlight_b);

        let view = surface.panel().unwrap();
        assert_eq!(view.header.text, "Toronto");
        assert_eq!(surface.focused(), Some(FocusTarget::Panel(PanelElement::Container)));
    }

    /// A marker without properties shows the fallback text
    #[tokio::test]
    async fn test_empty_properties_panel() {
        let source = StaticFeatureSource::new().with_document(SITES_URL, SITES);
        let (map, surface) = loaded_map(sites_config(""), source).await;
        let empty = surface.markers()[2].id();

        map.handle_marker_event(empty, &InputEvent::click());

        let view = surface.panel().unwrap();
        assert_eq!(view.body, PanelBody::Text("No properties".to_string()));
        assert_eq!(view.header.text, "No properties");
    }

    /// Escape in the panel closes it and focus returns to the marker
    #[tokio::test(start_paused = true)]
    async fn test_escape_returns_focus_to_marker() {
        let source = StaticFeatureSource::new().with_document(SITES_URL, SITES);
        let (map, surface) = loaded_map(sites_config(""), source).await;
        let marker = surface.markers()[0].id();

        map.handle_marker_event(marker, &InputEvent::click());
        let handled = map.handle_panel_key(
            &InputEvent::key(KeyCode::Escape),
            Some(PanelElement::CloseButton),
        );

        assert_eq!(handled, EventHandled::Handled);
        assert_eq!(surface.focused(), Some(FocusTarget::Marker(marker)));
        assert!(!surface.panel_mounted());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(map.panel().state(), PanelState::Closed);

        // Panel closed: Escape on the map surface focuses the map
        assert_eq!(
            map.handle_map_key(&InputEvent::key(KeyCode::Escape)),
            EventHandled::Handled
        );
        assert_eq!(surface.focused(), Some(FocusTarget::Map));
    }

    /// Selecting another marker while the panel slides out keeps it open
    #[tokio::test(start_paused = true)]
    async fn test_reselect_during_close_keeps_panel_open() {
        let source = StaticFeatureSource::new().with_document(SITES_URL, SITES);
        let (map, surface) = loaded_map(sites_config(""), source).await;
        let markers = surface.markers();

        markers[0].select();
        map.panel().close();
        tokio::time::sleep(Duration::from_millis(40)).await;
        markers[1].select();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(map.panel().state(), PanelState::Open);
        assert!(surface.panel_mounted());
        assert_eq!(map.highlighted(), Some(markers[1].id()));
    }

    /// Tab cycling stays inside the open panel
    #[tokio::test]
    async fn test_focus_trap_over_property_rows() {
        let source = StaticFeatureSource::new().with_document(SITES_URL, SITES);
        let (map, surface) = loaded_map(sites_config(""), source).await;
        map.handle_marker_event(surface.markers()[0].id(), &InputEvent::click());

        // close button + three property rows
        let last = PanelElement::Row(2);
        map.handle_panel_key(&InputEvent::key(KeyCode::Tab), Some(last));
        assert_eq!(
            surface.focused(),
            Some(FocusTarget::Panel(PanelElement::CloseButton))
        );

        map.handle_panel_key(
            &InputEvent::key_with(KeyCode::Tab, KeyModifiers::SHIFT),
            Some(PanelElement::CloseButton),
        );
        assert_eq!(surface.focused(), Some(FocusTarget::Panel(last)));
    }

    /// Two maps never share selection state
    #[tokio::test]
    async fn test_instances_are_independent() {
        let source = || StaticFeatureSource::new().with_document(SITES_URL, SITES);
        let (first, first_surface) = loaded_map(sites_config(""), source()).await;
        let (second, _) = loaded_map(sites_config(""), source()).await;

        first.handle_marker_event(first_surface.markers()[0].id(), &InputEvent::click());

        assert!(first.highlighted().is_some());
        assert!(second.highlighted().is_none());
        assert_eq!(second.panel().state(), PanelState::Closed);
    }
}
