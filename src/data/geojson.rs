use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A GeoJSON position: `[lng, lat]` with an optional altitude.
pub type Position = Vec<f64>;

/// Feature properties in document order
pub type Properties = Map<String, Value>;

/// GeoJSON geometry types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point {
        coordinates: Position,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPoint {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    GeometryCollection {
        geometries: Vec<GeoJsonGeometry>,
    },
}

/// A feature: geometry plus a property mapping. Not mutated after loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub geometry: Option<GeoJsonGeometry>,
    #[serde(default)]
    pub properties: Option<Properties>,
}

impl FeatureRecord {
    /// Properties, treating `null` and `{}` alike as "no properties"
    pub fn properties(&self) -> Option<&Properties> {
        self.properties.as_ref().filter(|props| !props.is_empty())
    }

    /// Location of a point feature
    pub fn point(&self) -> Option<LatLng> {
        match &self.geometry {
            Some(GeoJsonGeometry::Point { coordinates }) => LatLng::from_position(coordinates),
            _ => None,
        }
    }

    /// First property value in document order
    pub fn first_property(&self) -> Option<&Value> {
        self.properties().and_then(|props| props.values().next())
    }
}

/// Root GeoJSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJson {
    Feature(FeatureRecord),
    FeatureCollection { features: Vec<FeatureRecord> },
}

impl GeoJson {
    /// Parses a GeoJSON document
    pub fn from_slice(bytes: &[u8]) -> crate::Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| crate::Error::ParseError(format!("Invalid GeoJSON: {}", e)))
    }

    pub fn into_features(self) -> Vec<FeatureRecord> {
        match self {
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::FeatureCollection { features } => features,
        }
    }
}

impl std::str::FromStr for GeoJson {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::from_slice(s.as_bytes())
    }
}

/// Style for non-point features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
}

impl Default for FeatureStyle {
    fn default() -> Self {
        Self {
            color: "#FFF".to_string(),
            weight: 5.0,
            opacity: 0.65,
        }
    }
}

/// Text shown for a property value: strings verbatim, everything else as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Whether a value would count as set in a boolean context: `null`,
/// `false`, `0` and `""` do not.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
