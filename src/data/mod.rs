pub mod geojson;
pub mod source;

pub use geojson::{FeatureRecord, GeoJson, GeoJsonGeometry};
pub use source::{FeatureSource, HttpFeatureSource, StaticFeatureSource};
