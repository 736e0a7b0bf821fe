//! Basemap composition
//!
//! Each supported projection has a catalog of raster tile services. The
//! composer turns the resolved basemap settings into an ordered list of
//! tile layer descriptors: an optional hillshade underneath, the main
//! basemap, and an optional label overlay on top. All descriptors share
//! one raised pane, so list order is stacking order.

use crate::{
    core::{
        config::{Language, MapConfiguration},
        constants::{
            BASEMAP_PANE, EPSG_CANADA_LCC, EPSG_WEB_MERCATOR, FALLBACK_BASEMAP_ID,
            LABEL_LOCALE_PLACEHOLDER, SHADED_MAIN_OPACITY, TILE_SIZE,
        },
        crs::ProjectionProvider,
    },
    prelude::HashMap,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

const SHADED_ID: &str = "shaded";
const LABEL_ID: &str = "label";

const GEO_CA: &str = "https://maps-cartes.services.geo.ca/server2_serveur2/rest/services/BaseMaps";
const OSM_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

const ATTRIBUTION_EN: &str = "© His Majesty the King in Right of Canada, as represented by Canada Mortgage and Housing Corporation";
const ATTRIBUTION_FR: &str = "© Sa Majesté le Roi du Chef du Canada, représenté par la Société canadienne d'hypothèques et de logement";

static LCC_CATALOG: Lazy<BasemapCatalog> = Lazy::new(BasemapCatalog::canada_lcc);
static WEB_MERCATOR_CATALOG: Lazy<BasemapCatalog> = Lazy::new(BasemapCatalog::web_mercator);

/// A tile service entry: URL template plus optional service metadata endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasemapSource {
    pub url: String,
    pub json_url: Option<String>,
}

impl BasemapSource {
    fn new(url: String) -> Self {
        Self {
            url,
            json_url: None,
        }
    }

    /// An ArcGIS WMTS service under the federal basemap root
    fn geo_ca(service: &str, layer: &str) -> Self {
        Self {
            url: format!(
                "{}/{}/MapServer/WMTS/tile/1.0.0/{}/default/default028mm/{{z}}/{{y}}/{{x}}.jpg",
                GEO_CA, service, layer
            ),
            json_url: Some(format!("{}/{}/MapServer?f=pjson", GEO_CA, service)),
        }
    }
}

/// The basemaps available for one projection
#[derive(Debug, Clone)]
pub struct BasemapCatalog {
    epsg: u32,
    entries: HashMap<&'static str, BasemapSource>,
}

impl BasemapCatalog {
    /// Catalog for the projection `epsg` actually resolves to
    pub fn for_projection(epsg: u32) -> &'static BasemapCatalog {
        match ProjectionProvider::effective_epsg(epsg) {
            EPSG_CANADA_LCC => &*LCC_CATALOG,
            _ => &*WEB_MERCATOR_CATALOG,
        }
    }

    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    pub fn has(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn lookup(&self, id: &str) -> Option<&BasemapSource> {
        self.entries.get(id)
    }

    fn canada_lcc() -> Self {
        let mut entries = HashMap::default();
        entries.insert(
            "transport",
            BasemapSource::geo_ca("CBMT_CBCT_GEOM_3978", "CBMT_CBCT_GEOM_3978"),
        );
        entries.insert("simple", BasemapSource::geo_ca("Simple", "Simple"));
        entries.insert(
            SHADED_ID,
            BasemapSource::geo_ca("CBME_CBCE_HS_RO_3978", "CBMT_CBCT_GEOM_3978"),
        );
        entries.insert(
            LABEL_ID,
            BasemapSource::geo_ca("xxxx_TXT_3978", "xxxx_TXT_3978"),
        );
        entries.insert("osm", BasemapSource::new(OSM_URL.to_string()));
        Self {
            epsg: EPSG_CANADA_LCC,
            entries,
        }
    }

    fn web_mercator() -> Self {
        let mut entries = HashMap::default();
        entries.insert(
            "transport",
            BasemapSource::geo_ca("CBMT_CBCT_GEOM_3857", "BaseMaps_CBMT_CBCT_GEOM_3857"),
        );
        entries.insert("simple", BasemapSource::geo_ca("Simple", "Simple"));
        // The federal hillshade is only published in 3978.
        entries.insert(
            SHADED_ID,
            BasemapSource::geo_ca("CBME_CBCE_HS_RO_3978", "CBMT_CBCT_GEOM_3978"),
        );
        entries.insert(
            LABEL_ID,
            BasemapSource::geo_ca("xxxx_TXT_3857", "xxxx_TXT_3857"),
        );
        entries.insert("osm", BasemapSource::new(OSM_URL.to_string()));
        Self {
            epsg: EPSG_WEB_MERCATOR,
            entries,
        }
    }
}

/// Options handed to the tile-layer constructor, shared by all basemaps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayerOptions {
    /// Inverted y-axis numbering
    pub tms: bool,
    /// Tile size in pixels
    pub tile_size: u32,
    /// Attribution text
    pub attribution: String,
    /// Whether the world is not repeated horizontally
    pub no_wrap: bool,
    pub attribution_control: bool,
}

impl TileLayerOptions {
    pub fn for_language(language: Language) -> Self {
        Self {
            tms: false,
            tile_size: TILE_SIZE,
            attribution: attribution(language).to_string(),
            no_wrap: false,
            attribution_control: false,
        }
    }
}

/// Attribution text for the basemap services
pub fn attribution(language: Language) -> &'static str {
    match language {
        Language::En => ATTRIBUTION_EN,
        Language::Fr => ATTRIBUTION_FR,
    }
}

/// One tile layer to add to the map, in stacking order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasemapLayerDescriptor {
    pub id: String,
    pub url: String,
    pub options: TileLayerOptions,
    pub opacity: f32,
    pub pane_name: String,
}

/// Derives the ordered basemap stack from a resolved configuration
pub struct BasemapComposer<'a> {
    catalog: &'a BasemapCatalog,
    options: TileLayerOptions,
    language: Language,
}

impl<'a> BasemapComposer<'a> {
    pub fn new(catalog: &'a BasemapCatalog, language: Language) -> Self {
        Self {
            catalog,
            options: TileLayerOptions::for_language(language),
            language,
        }
    }

    /// `[shaded?] main [label?]`; the result must not be reordered.
    pub fn compose_layers(config: &MapConfiguration) -> Vec<BasemapLayerDescriptor> {
        let catalog = BasemapCatalog::for_projection(config.map.projection);
        BasemapComposer::new(catalog, config.language).compose(config)
    }

    pub fn compose(&self, config: &MapConfiguration) -> Vec<BasemapLayerDescriptor> {
        let basemap = &config.map.basemap;
        let mut layers = Vec::with_capacity(3);
        let mut main_opacity = 1.0;

        if basemap.shaded {
            if let Some(source) = self.catalog.lookup(SHADED_ID) {
                layers.push(self.descriptor(SHADED_ID, source.url.clone(), 1.0));
                main_opacity = SHADED_MAIN_OPACITY;
            }
        }

        if let Some((id, source)) = self.main_source(&basemap.id) {
            layers.push(self.descriptor(id, source.url.clone(), main_opacity));
        }

        if basemap.labeled {
            if let Some(source) = self.catalog.lookup(LABEL_ID) {
                let url = source
                    .url
                    .replace(LABEL_LOCALE_PLACEHOLDER, label_locale(self.language));
                layers.push(self.descriptor(LABEL_ID, url, 1.0));
            }
        }

        log::debug!(
            "composed basemaps for EPSG:{}: {:?}",
            self.catalog.epsg(),
            layers.iter().map(|l| l.id.as_str()).collect::<Vec<_>>()
        );
        layers
    }

    /// The configured entry, or the transport basemap when the id is unknown
    fn main_source<'s>(&'s self, id: &'s str) -> Option<(&'s str, &'s BasemapSource)> {
        if let Some(source) = self.catalog.lookup(id) {
            return Some((id, source));
        }
        log::warn!(
            "basemap '{}' is not available in EPSG:{}, using '{}'",
            id,
            self.catalog.epsg(),
            FALLBACK_BASEMAP_ID
        );
        self.catalog
            .lookup(FALLBACK_BASEMAP_ID)
            .map(|source| (FALLBACK_BASEMAP_ID, source))
    }

    fn descriptor(&self, id: &str, url: String, opacity: f32) -> BasemapLayerDescriptor {
        BasemapLayerDescriptor {
            id: id.to_string(),
            url,
            options: self.options.clone(),
            opacity,
            pane_name: BASEMAP_PANE.to_string(),
        }
    }
}

/// Label service prefix: English (CBMT) or French (CBCT) toponyms.
fn label_locale(language: Language) -> &'static str {
    match language {
        Language::En => "CBMT",
        Language::Fr => "CBCT",
    }
}
