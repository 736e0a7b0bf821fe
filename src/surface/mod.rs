//! Boundary to the map-rendering library.
//!
//! The viewer never draws anything itself. It drives a [`MapSurface`]: an
//! abstraction over the map canvas engine (panes, tile layers, markers,
//! custom controls) and the DOM focus primitives. Hosts implement the trait
//! over their engine of choice; [`headless::HeadlessSurface`] records every
//! call and backs the tests and demos.

pub mod headless;

use crate::{
    core::{crs::ProjectionDefinition, geo::LatLng},
    layers::{
        basemap::BasemapLayerDescriptor,
        feature::FeatureShape,
        marker::{Marker, MarkerId},
    },
    ui::{panel::PanelElement, panel::PanelView, style::MarkerStyle},
};
use std::sync::Arc;

pub use headless::HeadlessSurface;

/// Everything the map surface needs at creation
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceOptions {
    /// DOM id of the host element
    pub element_id: String,
    pub crs: ProjectionDefinition,
    pub center: LatLng,
    pub zoom: u8,
    /// Places the surface in keyboard tab order
    pub tab_index: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Placement of the built-in and custom controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlLayout {
    pub attribution_prefix: String,
    pub attribution_position: ControlPosition,
    pub zoom_position: ControlPosition,
    pub panel_position: ControlPosition,
}

impl Default for ControlLayout {
    fn default() -> Self {
        Self {
            attribution_prefix: String::new(),
            attribution_position: ControlPosition::BottomLeft,
            zoom_position: ControlPosition::BottomRight,
            panel_position: ControlPosition::TopLeft,
        }
    }
}

/// Something that can hold keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusTarget {
    Map,
    Marker(MarkerId),
    Panel(PanelElement),
}

/// The rendering engine as seen by the viewer.
///
/// Methods take `&self`: one surface is shared by every event handler of
/// a map instance.
pub trait MapSurface: Send + Sync {
    /// Creates the map in the host element
    fn initialize(&self, options: &SurfaceOptions);

    fn configure_controls(&self, layout: &ControlLayout);

    /// Creates a named layering container
    fn create_pane(&self, name: &str, z_index: i32);

    /// Adds a tile layer on top of those already in its pane
    fn add_tile_layer(&self, layer: &BasemapLayerDescriptor);

    fn add_marker(&self, marker: Arc<Marker>);

    fn add_shape(&self, shape: &FeatureShape);

    /// Applies a partial style update to a marker's icon
    fn set_marker_style(&self, marker: MarkerId, style: &MarkerStyle);

    /// Adds the details panel as a custom control
    fn mount_panel(&self, view: &PanelView);

    /// Re-renders a mounted panel
    fn update_panel(&self, view: &PanelView);

    /// Removes the panel control (and its subtree) from the map
    fn unmount_panel(&self);

    fn focus(&self, target: FocusTarget);
}
