//! Geographic point type shared by the geometry and filter modules.

use geo_types::{Coord, Point};
use serde::{Deserialize, Serialize};

use crate::geometry::distance::COORDINATE_EPSILON_DEGREES;

/// Geographic point in decimal degrees (WGS84).
///
/// Serialized with the short field names `y` (latitude) and `x` (longitude)
/// so existing filter configuration stays wire compatible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "y")]
    pub latitude: f64,
    #[serde(rename = "x")]
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude in [-90, 90] and longitude in [-180, 180].
    pub fn is_geo_coordinate_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Coordinate-valid and not null island.
    ///
    /// Geolocation providers report (0, 0) when they have no answer, so a
    /// resolved location sitting exactly there is treated as unknown.
    pub fn is_practically_valid(&self) -> bool {
        self.is_geo_coordinate_valid() && !self.is_zero()
    }

    /// Exactly (0, 0).
    pub fn is_zero(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    /// Equality within [`COORDINATE_EPSILON_DEGREES`] on both axes.
    pub fn approx_eq(&self, other: &GeoPoint) -> bool {
        (self.latitude - other.latitude).abs() <= COORDINATE_EPSILON_DEGREES
            && (self.longitude - other.longitude).abs() <= COORDINATE_EPSILON_DEGREES
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(p: GeoPoint) -> Self {
        Coord {
            x: p.longitude,
            y: p.latitude,
        }
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(p: GeoPoint) -> Self {
        Point::new(p.longitude, p.latitude)
    }
}

impl From<Coord<f64>> for GeoPoint {
    fn from(c: Coord<f64>) -> Self {
        GeoPoint::new(c.y, c.x)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}
