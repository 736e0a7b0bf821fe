//! Map builder for fluent API configuration
//!
//! Collects the configuration, the rendering surface and the feature source
//! of a map widget and hands them to [`MapController`].

use crate::{
    core::{
        config::{ConfigResolver, MapConfiguration, PartialMapConfig},
        constants::PANEL_CLOSE_DELAY,
        map::MapController,
    },
    data::source::{FeatureSource, HttpFeatureSource},
    surface::{HeadlessSurface, MapSurface},
    ui::style::PanelStyle,
    Result,
};
use std::{sync::Arc, time::Duration};

enum ConfigInput {
    Partial(Option<PartialMapConfig>),
    Json(String),
    Resolved(MapConfiguration),
}

/// Builder for creating and configuring map widgets
pub struct MapBuilder {
    map_id: String,
    config: ConfigInput,
    surface: Option<Arc<dyn MapSurface>>,
    source: Option<Arc<dyn FeatureSource>>,
    panel_style: PanelStyle,
    close_delay: Duration,
}

impl MapBuilder {
    /// Starts a map for the host element `map_id` with an all-default
    /// configuration
    pub fn new(map_id: impl Into<String>) -> Self {
        Self {
            map_id: map_id.into(),
            config: ConfigInput::Partial(None),
            surface: None,
            source: None,
            panel_style: PanelStyle::default(),
            close_delay: PANEL_CLOSE_DELAY,
        }
    }

    /// Partial configuration, defaulted on build
    pub fn with_config(mut self, config: PartialMapConfig) -> Self {
        self.config = ConfigInput::Partial(Some(config));
        self
    }

    /// JSON configuration, parsed and defaulted on build
    pub fn with_config_json(mut self, json: impl Into<String>) -> Self {
        self.config = ConfigInput::Json(json.into());
        self
    }

    /// Skips resolution and uses `config` as is
    pub fn with_resolved_config(mut self, config: MapConfiguration) -> Self {
        self.config = ConfigInput::Resolved(config);
        self
    }

    /// Rendering surface; a [`HeadlessSurface`] when unset
    pub fn with_surface(mut self, surface: Arc<dyn MapSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Feature endpoint client; HTTP when unset
    pub fn with_feature_source(mut self, source: Arc<dyn FeatureSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_panel_style(mut self, style: PanelStyle) -> Self {
        self.panel_style = style;
        self
    }

    /// Time the panel takes to slide out before it counts as closed
    pub fn with_close_delay(mut self, delay: Duration) -> Self {
        self.close_delay = delay;
        self
    }

    /// Builds the map. Fails only when a JSON configuration is malformed.
    pub fn build(self) -> Result<MapController> {
        let config = match self.config {
            ConfigInput::Partial(partial) => ConfigResolver::resolve(partial),
            ConfigInput::Json(json) => {
                ConfigResolver::resolve(Some(PartialMapConfig::from_json(&json)?))
            }
            ConfigInput::Resolved(config) => config,
        };

        let surface = self
            .surface
            .unwrap_or_else(|| Arc::new(HeadlessSurface::new()) as Arc<dyn MapSurface>);
        let source = self
            .source
            .unwrap_or_else(|| Arc::new(HttpFeatureSource::new()) as Arc<dyn FeatureSource>);

        Ok(MapController::with_config(
            self.map_id,
            config,
            surface,
            source,
            self.panel_style,
            self.close_delay,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Language;

    #[tokio::test]
    async fn test_build_with_defaults() {
        let map = MapBuilder::new("map").build().unwrap();
        assert_eq!(map.map_id(), "map");
        assert_eq!(map.config(), &MapConfiguration::default());
        assert_eq!(map.projection().epsg, 3857);
    }

    #[tokio::test]
    async fn test_build_from_json() {
        let map = MapBuilder::new("map")
            .with_config_json(r#"{ "language": "fr", "map": { "projection": 3978 } }"#)
            .build()
            .unwrap();
        assert_eq!(map.config().language, Language::Fr);
        assert_eq!(map.projection().epsg, 3978);
    }

    #[test]
    fn test_malformed_json_fails() {
        let result = MapBuilder::new("map").with_config_json("{ not json").build();
        assert!(matches!(result, Err(crate::MapError::Serialization(_))));
    }
}
