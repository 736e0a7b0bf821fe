use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Builds a coordinate from a GeoJSON position (`[lng, lat, ...]`).
    /// Positions with fewer than two ordinates are rejected.
    pub fn from_position(position: &[f64]) -> Option<Self> {
        match position {
            [lng, lat, ..] => Some(Self::new(*lat, *lng)),
            _ => None,
        }
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<[f64; 2]> for LatLng {
    /// `[lat, lng]`, the order used by map configuration centres.
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

/// Represents a point in screen or projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_centre_is_lat_lng() {
        assert_eq!(LatLng::from([50.0, -100.0]), LatLng::new(50.0, -100.0));
    }

    #[test]
    fn test_from_position_swaps_axes() {
        let pos = LatLng::from_position(&[-75.7, 45.4]).unwrap();
        assert_eq!(pos, LatLng::new(45.4, -75.7));

        let with_altitude = LatLng::from_position(&[-75.7, 45.4, 120.0]).unwrap();
        assert_eq!(with_altitude, pos);

        assert!(LatLng::from_position(&[1.0]).is_none());
    }

    #[test]
    fn test_point_subtract() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(3.0, 5.0);
        assert_eq!(b.subtract(&a), Point::new(2.0, 3.0));
    }
}
