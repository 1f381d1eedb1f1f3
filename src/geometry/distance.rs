//! Great-circle and planar distance math.
//!
//! Great-circle distances assume a spherical Earth of mean radius
//! [`EARTH_RADIUS_METERS`]. Point-to-segment distances are computed in a
//! local metric plane obtained from a spherical Mercator projection, which is
//! conformal and therefore preserves the right angle of the perpendicular foot.

use crate::models::GeoPoint;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// GPS-level slack when deciding whether a point lies on a line.
pub const LINE_MATCH_EPSILON_METERS: f64 = 6.0;

/// Fallback containment tolerance when a caller does not supply one.
pub const DEFAULT_PROXIMITY_TOLERANCE_METERS: f64 = 5.0;

/// Fuzzy boundary radius used when matching locations against filter polygons.
pub const DEFAULT_GEOFENCE_RADIUS_METERS: f64 = 6000.0;

/// Slack for treating two coordinates as the same point.
pub const COORDINATE_EPSILON_DEGREES: f64 = 1e-6;

/// Returned by the segment helpers when the inputs cannot be measured.
pub const SENTINEL_DISTANCE: f64 = f64::MAX;

// Spherical Mercator diverges at the poles
const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_78;

/// Great-circle distance in kilometres.
pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    haversine_central_angle(a, b) * EARTH_RADIUS_KM
}

/// Great-circle distance in metres.
pub fn haversine_meters(a: &GeoPoint, b: &GeoPoint) -> f64 {
    haversine_central_angle(a, b) * EARTH_RADIUS_METERS
}

fn haversine_central_angle(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

/// Spherical Mercator projection in metres, before latitude scale correction.
fn mercator(p: &GeoPoint) -> (f64, f64) {
    let lat = p
        .latitude
        .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
        .to_radians();
    let x = EARTH_RADIUS_METERS * p.longitude.to_radians();
    let y = EARTH_RADIUS_METERS * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();
    (x, y)
}

/// Euclidean distance from `p` to segment `a`-`b`, with the foot of the
/// perpendicular clamped to the segment.
fn planar_point_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return ((p.0 - a.0).powi(2) + (p.1 - a.1).powi(2)).sqrt();
    }

    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0);
    let (fx, fy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - fx).powi(2) + (p.1 - fy).powi(2)).sqrt()
}

/// Distance in metres from `point` to the segment `start`-`end`.
///
/// All three points are projected with spherical Mercator; the result is
/// scaled by the cosine of the query latitude so it reads as true metres in
/// the neighbourhood of `point`. Invalid coordinates yield [`SENTINEL_DISTANCE`].
pub fn point_to_segment_meters(point: &GeoPoint, start: &GeoPoint, end: &GeoPoint) -> f64 {
    if !point.is_geo_coordinate_valid()
        || !start.is_geo_coordinate_valid()
        || !end.is_geo_coordinate_valid()
    {
        return SENTINEL_DISTANCE;
    }

    let scale = point
        .latitude
        .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
        .to_radians()
        .cos();

    planar_point_segment(mercator(point), mercator(start), mercator(end)) * scale
}

/// Coarser point-to-segment distance in metres using an equirectangular
/// approximation around the mean latitude of the three points.
pub fn point_to_segment_meters_equirectangular(
    point: &GeoPoint,
    start: &GeoPoint,
    end: &GeoPoint,
) -> f64 {
    if !point.is_geo_coordinate_valid()
        || !start.is_geo_coordinate_valid()
        || !end.is_geo_coordinate_valid()
    {
        return SENTINEL_DISTANCE;
    }

    let mean_lat = ((point.latitude + start.latitude + end.latitude) / 3.0).to_radians();
    let k = mean_lat.cos();
    let project = |g: &GeoPoint| {
        (
            EARTH_RADIUS_METERS * g.longitude.to_radians() * k,
            EARTH_RADIUS_METERS * g.latitude.to_radians(),
        )
    };

    planar_point_segment(project(point), project(start), project(end))
}
