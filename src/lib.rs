//! # geomap
//!
//! Core of an accessible, embeddable map widget.
//!
//! A [`MapController`] takes a partial configuration, fills in the gaps,
//! selects a coordinate reference system (including the Canada Atlas
//! Lambert projection, EPSG:3978), stacks basemap tile layers in a fixed
//! order and loads a feature overlay whose markers drive a keyboard
//! accessible details panel.
//!
//! Drawing is delegated to a [`MapSurface`] supplied by the host; the
//! [`HeadlessSurface`] records calls instead of rendering.

pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod runtime;
pub mod surface;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    bounds::Bounds,
    builder::MapBuilder,
    config::{ConfigResolver, MapConfiguration, PartialMapConfig},
    crs::{ProjectionDefinition, ProjectionProvider},
    geo::{LatLng, Point},
    map::MapController,
    session::{PanelState, SharedSession},
};

pub use layers::{
    basemap::{BasemapComposer, BasemapLayerDescriptor},
    feature::FeatureLayerLoader,
    marker::{Marker, MarkerId},
};

pub use data::{geojson::GeoJson, source::FeatureSource};

pub use input::events::InputEvent;

pub use surface::{HeadlessSurface, MapSurface};

pub use ui::panel::{ContentPayload, DetailPanelController};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Error type alias for convenience
pub type Error = MapError;
