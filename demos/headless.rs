use geomap::prelude::*;

const SITES_URL: &str = "https://example.test/housing-sites.geojson";

const SITES: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        { "type": "Feature",
          "geometry": { "type": "Point", "coordinates": [-75.6972, 45.4215] },
          "properties": { "name": "Ottawa", "units": 412 } },
        { "type": "Feature",
          "geometry": { "type": "Point", "coordinates": [-73.5673, 45.5017] },
          "properties": { "name": "Montréal", "units": 958 } }
    ]
}"#;

const CONFIG: &str = r#"{
    "language": "fr",
    "map": {
        "projection": 3978,
        "zoom": 4,
        "basemap": { "id": "simple", "shaded": true }
    },
    "layers": [
        { "id": "sites", "config": { "url": "https://example.test/housing-sites.geojson" } }
    ]
}"#;

/// Example of driving the widget without any renderer
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let surface = Arc::new(HeadlessSurface::new());
    let source = StaticFeatureSource::new()
        .with_document(SITES_URL, SITES)
        .with_latency(Duration::from_millis(20));

    let map = MapBuilder::new("housing-map")
        .with_config_json(CONFIG)
        .with_surface(surface.clone())
        .with_feature_source(Arc::new(source))
        .build()?;

    println!("Map '{}' in {}", map.map_id(), map.projection().code());
    for layer in map.basemaps() {
        println!("  basemap {:<8} opacity {:.2}  {}", layer.id, layer.opacity, layer.url);
    }

    while map.is_loading() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let markers = surface.markers();
    println!("Loaded {} markers", markers.len());

    let first = markers
        .first()
        .ok_or_else(|| anyhow::anyhow!("overlay produced no markers"))?;
    map.handle_marker_event(first.id(), &InputEvent::key(KeyCode::Enter));
    if let Some(view) = surface.panel() {
        println!("Panel header: {}", view.header.text);
    }

    map.handle_panel_key(&InputEvent::key(KeyCode::Escape), None);
    tokio::time::sleep(Duration::from_millis(150)).await;
    println!(
        "Panel state after Escape: {:?}, focus on {:?}",
        map.panel().state(),
        surface.focused()
    );

    Ok(())
}
