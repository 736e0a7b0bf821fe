//! Coordinate reference system definitions
//!
//! The viewer supports two projections: spherical web-mercator (the default
//! for every EPSG code it does not recognise) and the Canada Atlas Lambert
//! Conformal Conic projection served by the federal basemap tile services.
//! The LCC definition is hand-built from a fixed resolution pyramid, tile
//! origin and extent.
//!
//! The proj-string of every custom projection is also published in a
//! process-wide registry consumed by the coordinate-transform library.

use crate::{
    core::{
        bounds::Bounds,
        constants::{EARTH_RADIUS, EPSG_CANADA_LCC, EPSG_WEB_MERCATOR},
        geo::Point,
    },
    prelude::HashMap,
};
use once_cell::sync::Lazy;
use std::{f64::consts::PI, sync::RwLock};

/// Number of zoom levels in each resolution pyramid.
pub const ZOOM_LEVELS: usize = 20;

/// Map units per pixel at zoom 0 of the LCC tile service.
const LCC_TOP_RESOLUTION: f64 = 38364.660062653464;

/// Tile-matrix origin of the LCC tile service.
const LCC_ORIGIN: [f64; 2] = [-34655800.0, 39310000.0];

/// LCC tile layer extent: xmin, ymin, xmax, ymax.
const LCC_BBOX: [f64; 4] = [-6211271.0, -5367092.0, 5972815.0, 4761177.0];

const LCC_PROJ4: &str = "+proj=lcc +lat_1=49 +lat_2=77 +lat_0=49 +lon_0=-95 +x_0=0 +y_0=0 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs";

/// Half the equatorial circumference of the spherical earth.
const MERCATOR_HALF_EXTENT: f64 = PI * EARTH_RADIUS;

/// Physical size of a CSS pixel in metres (96 dpi).
const METRES_PER_PIXEL: f64 = 0.0254 / 96.0;

/// Affine map from projected metres into the renderer's unit square.
/// Shared by both projections and built once.
static UNIT_SQUARE_TRANSFORMATION: Lazy<Transformation> = Lazy::new(|| {
    let scale = 0.5 / (PI * EARTH_RADIUS);
    Transformation::new(scale, 0.5, -scale, 0.5)
});

/// Proj-string definitions keyed by `EPSG:<code>`.
static PROJ_DEFS: Lazy<RwLock<HashMap<String, String>>> =
    Lazy::new(|| RwLock::new(HashMap::default()));

/// `x' = scale * (a * x + b)`, `y' = scale * (c * y + d)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformation {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Transformation {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    pub fn transform(&self, point: &Point, scale: f64) -> Point {
        Point::new(
            scale * (self.a * point.x + self.b),
            scale * (self.c * point.y + self.d),
        )
    }

    pub fn untransform(&self, point: &Point, scale: f64) -> Point {
        Point::new(
            (point.x / scale - self.b) / self.a,
            (point.y / scale - self.d) / self.c,
        )
    }
}

/// A CRS as handed to the map-rendering library.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionDefinition {
    pub epsg: u32,
    pub proj4: Option<&'static str>,
    /// Map units per pixel, one entry per zoom level, strictly decreasing.
    pub resolutions: Vec<f64>,
    /// Top-left corner of the tile matrix, in map units.
    pub origin: Point,
    pub bounds: Bounds,
    pub transformation: Transformation,
}

impl ProjectionDefinition {
    /// `EPSG:<code>`
    pub fn code(&self) -> String {
        epsg_key(self.epsg)
    }

    pub fn max_zoom(&self) -> usize {
        self.resolutions.len().saturating_sub(1)
    }

    /// Resolution at an integer zoom level, clamped to the pyramid.
    pub fn resolution(&self, zoom: usize) -> f64 {
        self.resolutions[zoom.min(self.max_zoom())]
    }

    /// Pixels per map unit at `zoom`. Fractional zooms interpolate
    /// geometrically between neighbouring levels.
    pub fn scale(&self, zoom: f64) -> f64 {
        let zoom = zoom.clamp(0.0, self.max_zoom() as f64);
        let base = zoom.floor() as usize;
        let base_scale = 1.0 / self.resolution(base);
        if base == self.max_zoom() || zoom == zoom.floor() {
            return base_scale;
        }
        let next_scale = 1.0 / self.resolution(base + 1);
        base_scale * (next_scale / base_scale).powf(zoom - base as f64)
    }

    /// Inverse of [`ProjectionDefinition::scale`].
    pub fn zoom(&self, scale: f64) -> f64 {
        let scales: Vec<f64> = self.resolutions.iter().map(|r| 1.0 / r).collect();
        if scale <= scales[0] {
            return 0.0;
        }
        for (level, pair) in scales.windows(2).enumerate() {
            let (low, high) = (pair[0], pair[1]);
            if scale <= high {
                return level as f64 + (scale / low).ln() / (high / low).ln();
            }
        }
        self.max_zoom() as f64
    }

    /// Nominal map scale (1:N) at an integer zoom level.
    pub fn scale_denominator(&self, zoom: usize) -> f64 {
        self.resolution(zoom) / METRES_PER_PIXEL
    }
}

/// Maps EPSG codes to CRS definitions
pub struct ProjectionProvider;

impl ProjectionProvider {
    /// Returns the CRS for `epsg`. Codes other than 3978 silently degrade
    /// to web-mercator; there is no unsupported-code error.
    pub fn projection_for(epsg: u32) -> ProjectionDefinition {
        match epsg {
            EPSG_CANADA_LCC => {
                register_proj_def(EPSG_CANADA_LCC, LCC_PROJ4);
                Self::canada_lcc()
            }
            other => {
                if other != EPSG_WEB_MERCATOR {
                    log::debug!("EPSG:{} has no definition, using EPSG:3857", other);
                }
                Self::web_mercator()
            }
        }
    }

    /// The code whose definition `projection_for(epsg)` actually returns
    pub fn effective_epsg(epsg: u32) -> u32 {
        match epsg {
            EPSG_CANADA_LCC => EPSG_CANADA_LCC,
            _ => EPSG_WEB_MERCATOR,
        }
    }

    /// Publishes every custom proj-string into the registry
    pub fn register_defaults() {
        register_proj_def(EPSG_CANADA_LCC, LCC_PROJ4);
    }

    fn canada_lcc() -> ProjectionDefinition {
        // Extent corners are (y, x) pairs; tile consumers expect exactly
        // these bounds.
        let p1 = Point::new(LCC_BBOX[1], LCC_BBOX[0]);
        let p2 = Point::new(LCC_BBOX[3], LCC_BBOX[2]);

        ProjectionDefinition {
            epsg: EPSG_CANADA_LCC,
            proj4: Some(LCC_PROJ4),
            resolutions: halving_pyramid(LCC_TOP_RESOLUTION),
            origin: Point::new(LCC_ORIGIN[0], LCC_ORIGIN[1]),
            bounds: Bounds::from_corners(p1, p2),
            transformation: *UNIT_SQUARE_TRANSFORMATION,
        }
    }

    fn web_mercator() -> ProjectionDefinition {
        ProjectionDefinition {
            epsg: EPSG_WEB_MERCATOR,
            proj4: None,
            resolutions: halving_pyramid(2.0 * MERCATOR_HALF_EXTENT / 256.0),
            origin: Point::new(-MERCATOR_HALF_EXTENT, MERCATOR_HALF_EXTENT),
            bounds: Bounds::from_coords(
                -MERCATOR_HALF_EXTENT,
                -MERCATOR_HALF_EXTENT,
                MERCATOR_HALF_EXTENT,
                MERCATOR_HALF_EXTENT,
            ),
            transformation: *UNIT_SQUARE_TRANSFORMATION,
        }
    }
}

fn halving_pyramid(top: f64) -> Vec<f64> {
    std::iter::successors(Some(top), |r| Some(r / 2.0))
        .take(ZOOM_LEVELS)
        .collect()
}

fn epsg_key(epsg: u32) -> String {
    format!("EPSG:{}", epsg)
}

/// Stores a proj-string under `EPSG:<epsg>`; last write wins.
pub fn register_proj_def(epsg: u32, definition: &str) {
    if let Ok(mut defs) = PROJ_DEFS.write() {
        defs.insert(epsg_key(epsg), definition.to_string());
        log::debug!("registered proj definition for EPSG:{}", epsg);
    }
}

/// Looks up a registered proj-string by `EPSG:<code>` key.
pub fn proj_def(code: &str) -> Option<String> {
    PROJ_DEFS.read().ok().and_then(|defs| defs.get(code).cloned())
}
