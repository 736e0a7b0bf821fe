//! The map widget controller
//!
//! Runs the initialization pipeline (resolve configuration, pick the
//! projection, create the surface, stack the basemaps, start the first
//! overlay load) and owns the per-instance session that ties marker
//! selection to the details panel.

use crate::{
    core::{
        config::{ConfigResolver, FeatureLayerConfig, MapConfiguration, PartialMapConfig},
        constants::{BASEMAP_PANE, BASEMAP_PANE_Z_INDEX, PANEL_CLOSE_DELAY},
        crs::{ProjectionDefinition, ProjectionProvider},
        session::SharedSession,
    },
    data::source::FeatureSource,
    input::events::{EventHandled, InputEvent, KeyCode},
    layers::{
        basemap::{BasemapComposer, BasemapLayerDescriptor},
        feature::{FeatureLayer, FeatureLayerLoader},
        marker::{Marker, MarkerId, SelectHandler},
    },
    runtime::AsyncHandle,
    surface::{ControlLayout, FocusTarget, MapSurface, SurfaceOptions},
    ui::{
        panel::{DetailPanelController, PanelElement},
        style::{MarkerStyle, PanelStyle},
    },
    Result,
};
use std::{
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};

/// One map widget instance
pub struct MapController {
    map_id: String,
    config: MapConfiguration,
    projection: ProjectionDefinition,
    basemaps: Vec<BasemapLayerDescriptor>,
    surface: Arc<dyn MapSurface>,
    session: SharedSession,
    panel: Arc<DetailPanelController>,
    loader: FeatureLayerLoader,
    loads: Mutex<Vec<Box<dyn AsyncHandle>>>,
}

impl MapController {
    /// Initializes a map in the element `map_id` from a possibly partial
    /// configuration. Only the feature fetch of `layers[0]` is left
    /// running when this returns.
    pub fn init(
        map_id: impl Into<String>,
        config: Option<PartialMapConfig>,
        surface: Arc<dyn MapSurface>,
        source: Arc<dyn FeatureSource>,
    ) -> Self {
        Self::with_config(
            map_id,
            ConfigResolver::resolve(config),
            surface,
            source,
            PanelStyle::default(),
            PANEL_CLOSE_DELAY,
        )
    }

    /// Same as [`MapController::init`] with an already resolved
    /// configuration and explicit panel options
    pub fn with_config(
        map_id: impl Into<String>,
        config: MapConfiguration,
        surface: Arc<dyn MapSurface>,
        source: Arc<dyn FeatureSource>,
        panel_style: PanelStyle,
        close_delay: Duration,
    ) -> Self {
        let map_id = map_id.into();

        ProjectionProvider::register_defaults();
        let projection = ProjectionProvider::projection_for(config.map.projection);
        log::info!("initializing map '{}' in {}", map_id, projection.code());

        surface.initialize(&SurfaceOptions {
            element_id: map_id.clone(),
            crs: projection.clone(),
            center: config.map.center,
            zoom: config.map.zoom,
            tab_index: 0,
        });
        surface.configure_controls(&ControlLayout::default());

        surface.create_pane(BASEMAP_PANE, BASEMAP_PANE_Z_INDEX);
        let basemaps = BasemapComposer::compose_layers(&config);
        for layer in &basemaps {
            surface.add_tile_layer(layer);
        }

        let session = SharedSession::new();
        let panel = Arc::new(DetailPanelController::with_options(
            surface.clone(),
            session.clone(),
            panel_style,
            close_delay,
        ));
        let loader = FeatureLayerLoader::new(source, surface.clone());

        let controller = Self {
            map_id,
            config,
            projection,
            basemaps,
            surface,
            session,
            panel,
            loader,
            loads: Mutex::new(Vec::new()),
        };

        if let Some(first) = controller.config.layers.first() {
            controller.load_layer(&first.config);
        }
        controller
    }

    /// Starts loading an overlay in the background. Returns false when
    /// nothing was started: the layer has no URL or there is no event loop.
    pub fn load_layer(&self, config: &FeatureLayerConfig) -> bool {
        match self.loader.load_layer(config, self.selection_handler()) {
            Some(handle) => {
                let mut loads = self.loads();
                loads.retain(|load| !load.is_finished());
                loads.push(handle);
                true
            }
            None => false,
        }
    }

    /// Loads an overlay and waits for it. Errors are returned instead of
    /// being logged and dropped.
    pub async fn load_layer_now(
        &self,
        config: &FeatureLayerConfig,
    ) -> Result<Option<FeatureLayer>> {
        self.loader.load(config, self.selection_handler()).await
    }

    /// The selection action run by every marker of this map
    pub fn selection_handler(&self) -> SelectHandler {
        let surface: Weak<dyn MapSurface> = Arc::downgrade(&self.surface);
        let panel = Arc::downgrade(&self.panel);
        let session = self.session.clone();
        Arc::new(move |marker: &Marker| {
            let (Some(surface), Some(panel)) = (surface.upgrade(), panel.upgrade()) else {
                log::debug!("marker {:?} selected after its map was dropped", marker.id());
                return;
            };
            select_marker(&*surface, &session, &panel, marker);
        })
    }

    /// Keydown on the map surface. Any key lifts the highlighted marker
    /// back above the others; Escape focuses the map when the panel is
    /// not open.
    pub fn handle_map_key(&self, event: &InputEvent) -> EventHandled {
        let InputEvent::KeyPress { key, .. } = event else {
            return EventHandled::NotHandled;
        };

        if let Some(marker) = self.session.highlighted() {
            self.surface.set_marker_style(marker, &MarkerStyle::raised());
        }

        if *key == KeyCode::Escape && !self.panel.is_open() {
            self.surface.focus(FocusTarget::Map);
            return EventHandled::Handled;
        }
        EventHandled::NotHandled
    }

    /// Click or keydown on a marker
    pub fn handle_marker_event(&self, marker: MarkerId, event: &InputEvent) -> EventHandled {
        match self.loader.marker(marker) {
            Some(marker) => marker.handle_event(event),
            None => EventHandled::NotHandled,
        }
    }

    /// Keydown inside the details panel
    pub fn handle_panel_key(
        &self,
        event: &InputEvent,
        focused: Option<PanelElement>,
    ) -> EventHandled {
        self.panel.handle_key(event, focused)
    }

    pub fn map_id(&self) -> &str {
        &self.map_id
    }

    pub fn config(&self) -> &MapConfiguration {
        &self.config
    }

    pub fn projection(&self) -> &ProjectionDefinition {
        &self.projection
    }

    /// Basemap layers in stacking order
    pub fn basemaps(&self) -> &[BasemapLayerDescriptor] {
        &self.basemaps
    }

    pub fn panel(&self) -> &DetailPanelController {
        &self.panel
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn highlighted(&self) -> Option<MarkerId> {
        self.session.highlighted()
    }

    pub fn marker(&self, id: MarkerId) -> Option<Arc<Marker>> {
        self.loader.marker(id)
    }

    /// True while a background overlay load is outstanding
    pub fn is_loading(&self) -> bool {
        self.loads().iter().any(|load| !load.is_finished())
    }

    fn loads(&self) -> MutexGuard<'_, Vec<Box<dyn AsyncHandle>>> {
        self.loads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for MapController {
    fn drop(&mut self) {
        for load in self.loads().drain(..) {
            load.cancel();
        }
    }
}

/// Moves the highlight to `marker` and shows its properties.
///
/// The previous marker is cleared before the new one is styled, so at most
/// one marker is highlighted at any point.
pub fn select_marker(
    surface: &dyn MapSurface,
    session: &SharedSession,
    panel: &DetailPanelController,
    marker: &Marker,
) {
    let previous = session.lock().replace_highlight(marker.id());
    if let Some(previous) = previous {
        surface.set_marker_style(previous, &MarkerStyle::cleared());
    }
    surface.set_marker_style(marker.id(), &MarkerStyle::highlighted());
    log::debug!("selected marker {:?} ({})", marker.id(), marker.tooltip());

    panel.open();
    panel.set_content(marker.content());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::session::PanelState,
        data::source::StaticFeatureSource,
        surface::HeadlessSurface,
        ui::panel::{ContentPayload, PanelBody},
    };

    const URL: &str = "mem://points";
    const DOC: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature",
              "geometry": { "type": "Point", "coordinates": [-75.69, 45.42] },
              "properties": { "name": "Ottawa", "units": 120 } },
            { "type": "Feature",
              "geometry": { "type": "Point", "coordinates": [-79.38, 43.65] },
              "properties": {} }
        ]
    }"#;

    fn config_json() -> String {
        format!(r#"{{ "layers": [ {{ "id": "points", "config": {{ "url": "{}" }} }} ] }}"#, URL)
    }

    async fn loaded_map() -> (MapController, Arc<HeadlessSurface>) {
        let surface = Arc::new(HeadlessSurface::new());
        let source = StaticFeatureSource::new().with_document(URL, DOC);
        let partial = PartialMapConfig::from_json(&config_json()).unwrap();
        let map = MapController::init("map", Some(partial), surface.clone(), Arc::new(source));
        while map.is_loading() {
            tokio::task::yield_now().await;
        }
        (map, surface)
    }

    #[tokio::test]
    async fn test_init_pipeline() {
        let (map, surface) = loaded_map().await;

        let options = surface.options().unwrap();
        assert_eq!(options.element_id, "map");
        assert_eq!(options.tab_index, 0);
        assert_eq!(options.zoom, 3);
        assert_eq!(options.crs, ProjectionProvider::projection_for(3857));

        assert_eq!(surface.panes(), vec![("basemapsPane".to_string(), 10)]);
        let ids: Vec<String> = surface.tile_layers().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, ["osm", "label"]);
        assert_eq!(map.basemaps().len(), 2);
        assert_eq!(surface.controls(), Some(ControlLayout::default()));
        assert_eq!(surface.markers().len(), 2);
    }

    #[tokio::test]
    async fn test_selection_is_exclusive() {
        let (map, surface) = loaded_map().await;
        let markers = surface.markers();
        let (a, b) = (markers[0].id(), markers[1].id());

        map.handle_marker_event(a, &InputEvent::click());
        assert!(surface.is_highlighted(a));

        map.handle_marker_event(b, &InputEvent::key(KeyCode::Enter));
        assert!(!surface.is_highlighted(a));
        assert!(surface.is_highlighted(b));
        assert_eq!(map.highlighted(), Some(b));

        let log = surface.style_log();
        let tail = &log[log.len() - 2..];
        assert_eq!(tail[0], (a, MarkerStyle::cleared()));
        assert_eq!(tail[1], (b, MarkerStyle::highlighted()));
    }

    #[tokio::test]
    async fn test_selection_fills_panel() {
        let (map, surface) = loaded_map().await;
        let markers = surface.markers();

        markers[0].select();
        assert_eq!(map.panel().state(), PanelState::Open);
        let view = surface.panel().unwrap();
        assert_eq!(view.header.text, "Ottawa");
        assert!(matches!(view.body, PanelBody::List(ref rows) if rows.len() == 2));

        markers[1].select();
        let view = surface.panel().unwrap();
        assert_eq!(view.body, PanelBody::Text("No properties".to_string()));
        assert_eq!(markers[1].content(), ContentPayload::Text("No properties".into()));
    }

    #[tokio::test]
    async fn test_map_key_raises_highlight() {
        let (map, surface) = loaded_map().await;
        let marker = surface.markers()[0].id();
        map.handle_marker_event(marker, &InputEvent::click());

        let before = surface.style_log().len();
        map.handle_map_key(&InputEvent::key(KeyCode::Other('a' as u32)));
        let log = surface.style_log();
        assert_eq!(log.len(), before + 1);
        assert_eq!(log[before], (marker, MarkerStyle::raised()));
    }

    #[tokio::test]
    async fn test_map_escape_focuses_map_when_panel_closed() {
        let (map, surface) = loaded_map().await;
        assert_eq!(
            map.handle_map_key(&InputEvent::key(KeyCode::Escape)),
            EventHandled::Handled
        );
        assert_eq!(surface.focused(), Some(FocusTarget::Map));

        map.panel().open();
        assert_eq!(
            map.handle_map_key(&InputEvent::key(KeyCode::Escape)),
            EventHandled::NotHandled
        );
    }

    #[tokio::test]
    async fn test_explicit_overlay_load() {
        let (map, surface) = loaded_map().await;
        assert!(!map.load_layer(&FeatureLayerConfig::default()));

        let layer = map
            .load_layer_now(&FeatureLayerConfig::new(URL))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(layer.markers().len(), 2);
        assert_eq!(surface.markers().len(), 4);

        layer.markers()[0].select();
        assert_eq!(map.highlighted(), Some(layer.markers()[0].id()));
    }

    #[tokio::test]
    async fn test_unknown_marker_is_ignored() {
        let (map, _) = loaded_map().await;
        assert_eq!(
            map.handle_marker_event(MarkerId(999), &InputEvent::click()),
            EventHandled::NotHandled
        );
    }
}
