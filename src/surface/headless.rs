//! A [`MapSurface`] that renders nothing and records everything.
//!
//! Used by the test suite and the headless demo to observe exactly what the
//! viewer asked the rendering engine to do, and in which order.

use super::{ControlLayout, FocusTarget, MapSurface, SurfaceOptions};
use crate::{
    layers::{
        basemap::BasemapLayerDescriptor,
        feature::FeatureShape,
        marker::{Marker, MarkerId},
    },
    prelude::HashMap,
    ui::{panel::PanelView, style::MarkerStyle},
};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct SurfaceState {
    options: Option<SurfaceOptions>,
    controls: Option<ControlLayout>,
    panes: Vec<(String, i32)>,
    tile_layers: Vec<BasemapLayerDescriptor>,
    markers: Vec<Arc<Marker>>,
    shapes: Vec<FeatureShape>,
    marker_styles: HashMap<MarkerId, MarkerStyle>,
    style_log: Vec<(MarkerId, MarkerStyle)>,
    panel: Option<PanelView>,
    panel_mounted: bool,
    focus_log: Vec<FocusTarget>,
}

#[derive(Default)]
pub struct HeadlessSurface {
    state: Mutex<SurfaceState>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SurfaceState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn options(&self) -> Option<SurfaceOptions> {
        self.state().options.clone()
    }

    pub fn controls(&self) -> Option<ControlLayout> {
        self.state().controls.clone()
    }

    pub fn panes(&self) -> Vec<(String, i32)> {
        self.state().panes.clone()
    }

    /// Tile layers in the order they were added (bottom first)
    pub fn tile_layers(&self) -> Vec<BasemapLayerDescriptor> {
        self.state().tile_layers.clone()
    }

    pub fn markers(&self) -> Vec<Arc<Marker>> {
        self.state().markers.clone()
    }

    pub fn shapes(&self) -> Vec<FeatureShape> {
        self.state().shapes.clone()
    }

    /// Effective style of a marker after every update so far
    pub fn marker_style(&self, marker: MarkerId) -> MarkerStyle {
        self.state()
            .marker_styles
            .get(&marker)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_highlighted(&self, marker: MarkerId) -> bool {
        self.marker_style(marker).is_highlighted()
    }

    /// Every style update, in call order
    pub fn style_log(&self) -> Vec<(MarkerId, MarkerStyle)> {
        self.state().style_log.clone()
    }

    /// Last panel render, mounted or not
    pub fn panel(&self) -> Option<PanelView> {
        self.state().panel.clone()
    }

    pub fn panel_mounted(&self) -> bool {
        self.state().panel_mounted
    }

    /// Element currently holding focus
    pub fn focused(&self) -> Option<FocusTarget> {
        self.state().focus_log.last().copied()
    }

    pub fn focus_log(&self) -> Vec<FocusTarget> {
        self.state().focus_log.clone()
    }
}

impl MapSurface for HeadlessSurface {
    fn initialize(&self, options: &SurfaceOptions) {
        log::debug!(
            "headless surface '{}' created with {}",
            options.element_id,
            options.crs.code()
        );
        self.state().options = Some(options.clone());
    }

    fn configure_controls(&self, layout: &ControlLayout) {
        self.state().controls = Some(layout.clone());
    }

    fn create_pane(&self, name: &str, z_index: i32) {
        self.state().panes.push((name.to_string(), z_index));
    }

    fn add_tile_layer(&self, layer: &BasemapLayerDescriptor) {
        self.state().tile_layers.push(layer.clone());
    }

    fn add_marker(&self, marker: Arc<Marker>) {
        self.state().markers.push(marker);
    }

    fn add_shape(&self, shape: &FeatureShape) {
        self.state().shapes.push(shape.clone());
    }

    fn set_marker_style(&self, marker: MarkerId, style: &MarkerStyle) {
        let mut state = self.state();
        state
            .marker_styles
            .entry(marker)
            .or_default()
            .merge(style);
        state.style_log.push((marker, style.clone()));
    }

    fn mount_panel(&self, view: &PanelView) {
        let mut state = self.state();
        state.panel = Some(view.clone());
        state.panel_mounted = true;
    }

    fn update_panel(&self, view: &PanelView) {
        self.state().panel = Some(view.clone());
    }

    fn unmount_panel(&self) {
        self.state().panel_mounted = false;
    }

    fn focus(&self, target: FocusTarget) {
        self.state().focus_log.push(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_updates_merge() {
        let surface = HeadlessSurface::new();
        let id = MarkerId(3);
        assert!(!surface.is_highlighted(id));

        surface.set_marker_style(id, &MarkerStyle::highlighted());
        surface.set_marker_style(id, &MarkerStyle::raised());
        assert!(surface.is_highlighted(id));

        surface.set_marker_style(id, &MarkerStyle::cleared());
        assert!(!surface.is_highlighted(id));
        assert_eq!(surface.style_log().len(), 3);
    }

    #[test]
    fn test_focus_tracks_last_target() {
        let surface = HeadlessSurface::new();
        assert_eq!(surface.focused(), None);
        surface.focus(FocusTarget::Map);
        surface.focus(FocusTarget::Marker(MarkerId(1)));
        assert_eq!(surface.focused(), Some(FocusTarget::Marker(MarkerId(1))));
        assert_eq!(surface.focus_log().len(), 2);
    }
}
