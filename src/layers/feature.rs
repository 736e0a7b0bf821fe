//! Feature overlay loading
//!
//! Fetches a feature collection, turns every point into an interactive
//! [`Marker`] and every other geometry into a styled [`FeatureShape`], then
//! hands them to the map surface. The fetch is the only suspension point of
//! the viewer: it runs on the event loop and its completion may land while
//! the user is interacting with markers from an earlier load.

use crate::{
    core::{config::FeatureLayerConfig, geo::LatLng},
    data::{
        geojson::{FeatureRecord, FeatureStyle, GeoJsonGeometry},
        source::FeatureSource,
    },
    layers::marker::{Marker, MarkerIcon, MarkerId, SelectHandler},
    prelude::HashMap,
    runtime::{self, AsyncHandle},
    surface::MapSurface,
    Result,
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};

/// A non-point geometry drawn with the overlay style
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureShape {
    pub geometry: GeoJsonGeometry,
    pub style: FeatureStyle,
    pub feature: Arc<FeatureRecord>,
}

/// The result of one overlay load
#[derive(Debug, Default)]
pub struct FeatureLayer {
    markers: Vec<Arc<Marker>>,
    shapes: Vec<FeatureShape>,
}

impl FeatureLayer {
    pub fn markers(&self) -> &[Arc<Marker>] {
        &self.markers
    }

    pub fn shapes(&self) -> &[FeatureShape] {
        &self.shapes
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty() && self.shapes.is_empty()
    }
}

/// Markers of every overlay loaded by one loader, by id
pub type MarkerRegistry = Arc<Mutex<HashMap<MarkerId, Arc<Marker>>>>;

#[derive(Clone)]
pub struct FeatureLayerLoader {
    source: Arc<dyn FeatureSource>,
    surface: Arc<dyn MapSurface>,
    next_marker: Arc<AtomicU64>,
    markers: MarkerRegistry,
}

impl FeatureLayerLoader {
    pub fn new(source: Arc<dyn FeatureSource>, surface: Arc<dyn MapSurface>) -> Self {
        Self {
            source,
            surface,
            next_marker: Arc::new(AtomicU64::new(1)),
            markers: Arc::default(),
        }
    }

    /// Starts loading `config` in the background. Returns `None` (and does
    /// nothing) when the layer has no URL or there is no event loop.
    /// Failures are logged and dropped: no markers appear and nothing else
    /// is affected.
    pub fn load_layer(
        &self,
        config: &FeatureLayerConfig,
        on_select: SelectHandler,
    ) -> Option<Box<dyn AsyncHandle>> {
        let url = config.url.as_deref().filter(|url| !url.is_empty())?;
        log::debug!("loading feature layer from {}", url);

        let loader = self.clone();
        let config = config.clone();
        runtime::spawn(async move {
            match loader.load(&config, on_select).await {
                Ok(Some(layer)) => log::info!(
                    "feature layer loaded: {} markers, {} shapes",
                    layer.markers().len(),
                    layer.shapes().len()
                ),
                Ok(None) => {}
                Err(e) => log::error!("failed to load feature layer: {}", e),
            }
        })
    }

    /// Fetches, builds and attaches one overlay. `Ok(None)` when the layer
    /// has no URL.
    pub async fn load(
        &self,
        config: &FeatureLayerConfig,
        on_select: SelectHandler,
    ) -> Result<Option<FeatureLayer>> {
        let Some(url) = config.url.as_deref().filter(|url| !url.is_empty()) else {
            return Ok(None);
        };

        let document = self.source.fetch(url).await?;
        let layer = self.build_layer(document.into_features(), config, &on_select);
        self.attach(&layer);
        Ok(Some(layer))
    }

    /// Builds markers and shapes without touching the surface
    pub fn build_layer(
        &self,
        features: Vec<FeatureRecord>,
        config: &FeatureLayerConfig,
        on_select: &SelectHandler,
    ) -> FeatureLayer {
        let icon = MarkerIcon::new(config.point_icon().map(str::to_string));
        let mut layer = FeatureLayer::default();

        for feature in features {
            let Some(geometry) = feature.geometry.clone() else {
                continue;
            };
            let feature = Arc::new(feature);
            let mut points = Vec::new();
            let mut shapes = Vec::new();
            split_geometry(geometry, &mut points, &mut shapes);

            for position in points {
                let id = MarkerId(self.next_marker.fetch_add(1, Ordering::Relaxed));
                layer.markers.push(Arc::new(Marker::new(
                    id,
                    position,
                    icon.clone(),
                    feature.clone(),
                    on_select.clone(),
                )));
            }

            layer.shapes.extend(shapes.into_iter().map(|geometry| FeatureShape {
                geometry,
                style: FeatureStyle::default(),
                feature: feature.clone(),
            }));
        }

        layer
    }

    /// Looks up a marker from any overlay this loader attached
    pub fn marker(&self, id: MarkerId) -> Option<Arc<Marker>> {
        self.registry().get(&id).cloned()
    }

    pub fn marker_count(&self) -> usize {
        self.registry().len()
    }

    fn attach(&self, layer: &FeatureLayer) {
        {
            let mut registry = self.registry();
            for marker in &layer.markers {
                registry.insert(marker.id(), marker.clone());
            }
        }
        for marker in &layer.markers {
            self.surface.add_marker(marker.clone());
        }
        for shape in &layer.shapes {
            self.surface.add_shape(shape);
        }
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, HashMap<MarkerId, Arc<Marker>>> {
        self.markers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Separates marker positions from geometries drawn as shapes.
/// Multi-points yield one marker per position.
fn split_geometry(
    geometry: GeoJsonGeometry,
    points: &mut Vec<LatLng>,
    shapes: &mut Vec<GeoJsonGeometry>,
) {
    match geometry {
        GeoJsonGeometry::Point { coordinates } => {
            points.extend(LatLng::from_position(&coordinates));
        }
        GeoJsonGeometry::MultiPoint { coordinates } => {
            points.extend(coordinates.iter().filter_map(|c| LatLng::from_position(c)));
        }
        GeoJsonGeometry::GeometryCollection { geometries } => {
            for inner in geometries {
                split_geometry(inner, points, shapes);
            }
        }
        other => shapes.push(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::source::StaticFeatureSource, surface::HeadlessSurface};
    use std::sync::atomic::AtomicUsize;

    const URL: &str = "mem://sites";

    const DOC: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature",
              "geometry": { "type": "Point", "coordinates": [-75.69, 45.42] },
              "properties": { "name": "Ottawa" } },
            { "type": "Feature",
              "geometry": { "type": "MultiPoint", "coordinates": [[-73.56, 45.50], [-71.21, 46.81]] },
              "properties": { "name": "Quebec corridor" } },
            { "type": "Feature",
              "geometry": { "type": "Polygon", "coordinates": [[[-80, 43], [-79, 43], [-79, 44], [-80, 43]]] },
              "properties": { "name": "Region" } },
            { "type": "Feature", "geometry": null, "properties": { "name": "Nowhere" } }
        ]
    }"#;

    fn setup(source: StaticFeatureSource) -> (FeatureLayerLoader, Arc<HeadlessSurface>) {
        let surface = Arc::new(HeadlessSurface::new());
        let loader = FeatureLayerLoader::new(Arc::new(source), surface.clone());
        (loader, surface)
    }

    fn noop() -> SelectHandler {
        Arc::new(|_| {})
    }

    fn layer_config() -> FeatureLayerConfig {
        FeatureLayerConfig::new(URL).with_point_icon("pin.svg")
    }

    #[tokio::test]
    async fn test_load_builds_markers_and_shapes() {
        let (loader, surface) = setup(StaticFeatureSource::new().with_document(URL, DOC));

        let layer = loader.load(&layer_config(), noop()).await.unwrap().unwrap();

        assert_eq!(layer.markers().len(), 3);
        assert_eq!(layer.shapes().len(), 1);
        assert_eq!(layer.shapes()[0].style, FeatureStyle::default());
        assert_eq!(surface.markers().len(), 3);
        assert_eq!(surface.shapes().len(), 1);
        assert_eq!(loader.marker_count(), 3);

        let tooltips: Vec<&str> = layer.markers().iter().map(|m| m.tooltip()).collect();
        assert_eq!(tooltips, ["Ottawa", "Quebec corridor", "Quebec corridor"]);
        assert!(layer
            .markers()
            .iter()
            .all(|m| m.icon().url.as_deref() == Some("pin.svg")));
    }

    #[tokio::test]
    async fn test_marker_ids_are_unique_across_loads() {
        let (loader, _surface) = setup(StaticFeatureSource::new().with_document(URL, DOC));

        let first = loader.load(&layer_config(), noop()).await.unwrap().unwrap();
        let second = loader.load(&layer_config(), noop()).await.unwrap().unwrap();

        let mut ids: Vec<MarkerId> = first
            .markers()
            .iter()
            .chain(second.markers())
            .map(|m| m.id())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
        assert!(loader.marker(ids[0]).is_some());
    }

    #[tokio::test]
    async fn test_missing_url_is_noop() {
        let (loader, surface) = setup(StaticFeatureSource::new());

        let config = FeatureLayerConfig::default();
        assert!(loader.load(&config, noop()).await.unwrap().is_none());
        assert!(loader.load_layer(&config, noop()).is_none());
        assert!(surface.markers().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported_by_load() {
        let (loader, _surface) = setup(StaticFeatureSource::new());
        assert!(loader.load(&layer_config(), noop()).await.is_err());
    }

    #[tokio::test]
    async fn test_background_failure_is_swallowed() {
        let (loader, surface) =
            setup(StaticFeatureSource::new().with_document(URL, "not geojson"));

        let handle = loader.load_layer(&layer_config(), noop()).unwrap();
        while !handle.is_finished() {
            tokio::task::yield_now().await;
        }
        assert!(surface.markers().is_empty());
    }

    #[tokio::test]
    async fn test_markers_share_selection_handler() {
        let (loader, _surface) = setup(StaticFeatureSource::new().with_document(URL, DOC));
        let selected = Arc::new(AtomicUsize::new(0));
        let counter = selected.clone();
        let on_select: SelectHandler = Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let layer = loader.load(&layer_config(), on_select).await.unwrap().unwrap();
        for marker in layer.markers() {
            marker.select();
        }
        assert_eq!(selected.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_missing_icon_uses_library_default() {
        let (loader, _surface) = setup(StaticFeatureSource::new());
        let features = DOC.parse::<crate::data::geojson::GeoJson>().unwrap().into_features();

        let layer = loader.build_layer(features, &FeatureLayerConfig::new(URL), &noop());
        assert!(layer.markers().iter().all(|m| m.icon().url.is_none()));
    }
}
