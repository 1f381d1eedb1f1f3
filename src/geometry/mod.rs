//! Distance math and containment predicates.
//!
//! Everything here is pure and safe to call from any number of threads.

pub mod containment;
pub mod distance;

pub use containment::point_in_ring;
pub use distance::{
    haversine_km, haversine_meters, point_to_segment_meters,
    point_to_segment_meters_equirectangular, COORDINATE_EPSILON_DEGREES,
    DEFAULT_GEOFENCE_RADIUS_METERS, DEFAULT_PROXIMITY_TOLERANCE_METERS, EARTH_RADIUS_KM,
    EARTH_RADIUS_METERS, LINE_MATCH_EPSILON_METERS, SENTINEL_DISTANCE,
};
