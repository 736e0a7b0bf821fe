//! Map configuration
//!
//! The viewer is driven by a nested, partially-specified configuration
//! object. [`PartialMapConfig`] mirrors that object with every field
//! optional; [`ConfigResolver`] fills the gaps with documented defaults and
//! produces the immutable [`MapConfiguration`] every other component reads.

use crate::core::{
    constants::{DEFAULT_BASEMAP_ID, DEFAULT_CENTER, DEFAULT_ZOOM, EPSG_WEB_MERCATOR},
    geo::LatLng,
};
use serde::{Deserialize, Serialize};

/// The two locales the viewer ships text for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Self::En),
            "fr" => Some(Self::Fr),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Configuration as supplied by the embedding page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialMapConfig {
    pub language: Option<String>,
    pub map: Option<PartialMapSettings>,
    pub layers: Option<Vec<LayerConfig>>,
}

impl PartialMapConfig {
    /// Parses a configuration object from JSON text
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialMapSettings {
    pub zoom: Option<u8>,
    pub projection: Option<u32>,
    /// `[lat, lng]`
    pub center: Option<[f64; 2]>,
    pub basemap: Option<PartialBasemapSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialBasemapSettings {
    pub id: Option<String>,
    pub shaded: Option<bool>,
    pub labeled: Option<bool>,
}

/// One feature overlay entry of the `layers` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub config: FeatureLayerConfig,
}

/// Where an overlay's features come from and how its markers look.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureLayerConfig {
    pub url: Option<String>,
    pub custom_marker_icon: Option<MarkerIconConfig>,
}

impl FeatureLayerConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            custom_marker_icon: None,
        }
    }

    pub fn with_point_icon(mut self, icon_url: impl Into<String>) -> Self {
        self.custom_marker_icon = Some(MarkerIconConfig {
            point: Some(icon_url.into()),
        });
        self
    }

    /// Icon URL for point features, if one is configured
    pub fn point_icon(&self) -> Option<&str> {
        self.custom_marker_icon
            .as_ref()
            .and_then(|icon| icon.point.as_deref())
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerIconConfig {
    pub point: Option<String>,
}

/// Fully resolved configuration. Immutable after resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfiguration {
    pub language: Language,
    pub map: MapSettings,
    pub layers: Vec<LayerConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub zoom: u8,
    pub projection: u32,
    pub center: LatLng,
    pub basemap: BasemapSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasemapSettings {
    pub id: String,
    pub shaded: bool,
    pub labeled: bool,
}

impl Default for BasemapSettings {
    fn default() -> Self {
        Self {
            id: DEFAULT_BASEMAP_ID.to_string(),
            shaded: false,
            labeled: true,
        }
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            projection: EPSG_WEB_MERCATOR,
            center: LatLng::from(DEFAULT_CENTER),
            basemap: BasemapSettings::default(),
        }
    }
}

impl Default for MapConfiguration {
    fn default() -> Self {
        Self {
            language: Language::default(),
            map: MapSettings::default(),
            layers: Vec::new(),
        }
    }
}

/// A configuration field that was filled in with its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultedField {
    Config,
    Language,
    UnknownLanguage(String),
    Map,
    Zoom,
    Projection,
    Center,
    Basemap,
    BasemapId,
    BasemapShaded,
    BasemapLabeled,
}

impl std::fmt::Display for DefaultedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config => write!(f, "No config provided, using defaults"),
            Self::Language => write!(f, "No language provided, using default 'en'"),
            Self::UnknownLanguage(code) => {
                write!(f, "Unsupported language '{}', using default 'en'", code)
            }
            Self::Map => write!(f, "No mapConfig.map provided, using defaults"),
            Self::Zoom => write!(
                f,
                "No mapConfig.map.zoom provided, using default '{}'",
                DEFAULT_ZOOM
            ),
            Self::Projection => write!(
                f,
                "No mapConfig.map.projection provided, using default '{}'",
                EPSG_WEB_MERCATOR
            ),
            Self::Center => write!(
                f,
                "No mapConfig.map.center provided, using default '{}, {}'",
                DEFAULT_CENTER[0], DEFAULT_CENTER[1]
            ),
            Self::Basemap => write!(f, "No mapConfig.map.basemap provided, using defaults"),
            Self::BasemapId => write!(
                f,
                "No mapConfig.map.basemap.id provided, using default '{}'",
                DEFAULT_BASEMAP_ID
            ),
            Self::BasemapShaded => write!(
                f,
                "No mapConfig.map.basemap.shaded provided, using default 'false'"
            ),
            Self::BasemapLabeled => write!(
                f,
                "No mapConfig.map.basemap.labeled provided, using default 'true'"
            ),
        }
    }
}

/// Fills in missing configuration fields. Never fails.
///
/// Empty strings and zero numerics count as missing; booleans are only
/// defaulted when absent so an explicit `false` survives.
pub struct ConfigResolver;

impl ConfigResolver {
    /// Resolves `partial`, logging one notice per defaulted field
    pub fn resolve(partial: Option<PartialMapConfig>) -> MapConfiguration {
        Self::resolve_with_report(partial).0
    }

    /// Resolves `partial` and also returns the fields that were defaulted,
    /// in resolution order
    pub fn resolve_with_report(
        partial: Option<PartialMapConfig>,
    ) -> (MapConfiguration, Vec<DefaultedField>) {
        let mut report = Vec::new();

        let partial = partial.unwrap_or_else(|| {
            report.push(DefaultedField::Config);
            PartialMapConfig::default()
        });

        let language = match partial.language.as_deref().filter(|s| !s.is_empty()) {
            None => {
                report.push(DefaultedField::Language);
                Language::default()
            }
            Some(code) => Language::parse(code).unwrap_or_else(|| {
                report.push(DefaultedField::UnknownLanguage(code.to_string()));
                Language::default()
            }),
        };

        let map = partial.map.unwrap_or_else(|| {
            report.push(DefaultedField::Map);
            PartialMapSettings::default()
        });

        let zoom = map.zoom.filter(|z| *z != 0).unwrap_or_else(|| {
            report.push(DefaultedField::Zoom);
            DEFAULT_ZOOM
        });

        let projection = map.projection.filter(|p| *p != 0).unwrap_or_else(|| {
            report.push(DefaultedField::Projection);
            EPSG_WEB_MERCATOR
        });

        let center = map.center.map(LatLng::from).unwrap_or_else(|| {
            report.push(DefaultedField::Center);
            LatLng::from(DEFAULT_CENTER)
        });

        let basemap = map.basemap.unwrap_or_else(|| {
            report.push(DefaultedField::Basemap);
            PartialBasemapSettings::default()
        });

        let id = basemap
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| {
                report.push(DefaultedField::BasemapId);
                DEFAULT_BASEMAP_ID.to_string()
            });

        let shaded = basemap.shaded.unwrap_or_else(|| {
            report.push(DefaultedField::BasemapShaded);
            false
        });

        let labeled = basemap.labeled.unwrap_or_else(|| {
            report.push(DefaultedField::BasemapLabeled);
            true
        });

        for field in &report {
            log::info!("{}", field);
        }

        let config = MapConfiguration {
            language,
            map: MapSettings {
                zoom,
                projection,
                center,
                basemap: BasemapSettings {
                    id,
                    shaded,
                    labeled,
                },
            },
            layers: partial.layers.unwrap_or_default(),
        };

        (config, report)
    }
}
