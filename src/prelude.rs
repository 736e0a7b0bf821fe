//! Prelude module for common geomap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use geomap::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    builder::MapBuilder,
    config::{
        BasemapSettings, ConfigResolver, FeatureLayerConfig, Language, LayerConfig,
        MapConfiguration, MapSettings, PartialMapConfig,
    },
    crs::{ProjectionDefinition, ProjectionProvider},
    geo::{LatLng, Point},
    map::MapController,
    session::{PanelState, SharedSession},
};

pub use crate::layers::{
    basemap::{BasemapCatalog, BasemapComposer, BasemapLayerDescriptor},
    feature::{FeatureLayer, FeatureLayerLoader, FeatureShape},
    marker::{Marker, MarkerIcon, MarkerId},
};

pub use crate::data::{
    geojson::{FeatureRecord, FeatureStyle, GeoJson, GeoJsonGeometry},
    source::{FeatureSource, HttpFeatureSource, StaticFeatureSource},
};

pub use crate::input::events::{EventHandled, InputEvent, KeyCode, KeyModifiers};

pub use crate::runtime::{runtime, spawn, spawn_after, AsyncHandle, AsyncSpawner};

pub use crate::surface::{FocusTarget, HeadlessSurface, MapSurface};

pub use crate::ui::{
    panel::{ContentPayload, DetailPanelController, PanelElement},
    style::{MarkerStyle, PanelStyle},
};

pub use crate::{Error as MapError, Result};

pub use std::{sync::Arc, time::Duration};

pub use fxhash::FxHashMap as HashMap;
