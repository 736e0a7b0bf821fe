//! Viewer-wide constants: configuration defaults, projection parameters and
//! the magic numbers of the basemap pane, markers and details panel.
//! Keeping them in a single place makes it easier to tweak them.

use std::time::Duration;

/// Default map zoom when the configuration omits one.
pub const DEFAULT_ZOOM: u8 = 3;

/// Default map centre (`[lat, lng]`) when the configuration omits one.
pub const DEFAULT_CENTER: [f64; 2] = [50.0, -100.0];

/// Default basemap identifier.
pub const DEFAULT_BASEMAP_ID: &str = "osm";

/// Catalog entry used when a configured basemap id is unknown.
pub const FALLBACK_BASEMAP_ID: &str = "transport";

/// Spherical web-mercator.
pub const EPSG_WEB_MERCATOR: u32 = 3857;

/// Canada Atlas Lambert Conformal Conic.
pub const EPSG_CANADA_LCC: u32 = 3978;

/// Earth mean radius (metres) used by the spherical projections.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Name of the pane hosting every basemap tile layer.
pub const BASEMAP_PANE: &str = "basemapsPane";

/// Stacking order of the basemap pane.
pub const BASEMAP_PANE_Z_INDEX: i32 = 10;

/// Opacity of the main basemap when drawn over the hillshade layer.
pub const SHADED_MAIN_OPACITY: f32 = 0.75;

/// Placeholder in label URL templates replaced by the locale code.
pub const LABEL_LOCALE_PLACEHOLDER: &str = "xxxx";

/// Marker icon size in pixels.
pub const MARKER_ICON_SIZE: (u32, u32) = (30, 30);

/// Anchor inside the icon (hot-spot) in pixel coords.
pub const MARKER_ICON_ANCHOR: (u32, u32) = (0, 0);

/// Stacking order of a highlighted marker.
pub const HIGHLIGHT_Z_INDEX: i32 = 1000;

/// Tooltip text for features without a usable first property.
pub const FALLBACK_TOOLTIP: &str = "Item";

/// Panel content for features without properties.
pub const NO_PROPERTIES_TEXT: &str = "No properties";

/// Panel width in CSS pixels; the hidden panel sits at `-PANEL_WIDTH_PX`.
pub const PANEL_WIDTH_PX: i32 = 300;

/// Time the slide-out animation needs before the panel counts as closed.
pub const PANEL_CLOSE_DELAY: Duration = Duration::from_millis(100);
