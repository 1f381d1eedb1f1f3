//! Containment and proximity predicates over [`PointSet`].
//!
//! None of these predicates fail: invalid targets, non-positive radii and
//! degenerate sets simply answer `false`.

use geo::{Intersects, LineString, Point, Polygon};

use super::distance::{
    haversine_meters, point_to_segment_meters, DEFAULT_PROXIMITY_TOLERANCE_METERS,
};
use crate::models::{GeoPoint, PointSet, Shape};

/// Ring containment against an implicitly closed ring. Points on an edge or
/// vertex count as inside.
pub fn point_in_ring(target: &GeoPoint, ring: &[GeoPoint]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let exterior: LineString<f64> = ring.iter().map(|p| geo::Coord::from(*p)).collect();
    let polygon = Polygon::new(exterior, vec![]);

    polygon.intersects(&Point::from(*target))
}

impl PointSet {
    /// Whether `target` lies on this set.
    ///
    /// Null-island points are dropped before the shape is classified. A
    /// target matches when it coincides with a vertex, lies within
    /// `tolerance` metres of a line, or falls inside a polygon ring.
    /// `tolerance` defaults to [`DEFAULT_PROXIMITY_TOLERANCE_METERS`] when
    /// absent or not positive.
    pub fn contains_point(&self, target: &GeoPoint, tolerance: Option<f64>) -> bool {
        if !target.is_geo_coordinate_valid() {
            return false;
        }

        let cleaned = self.cleaned();
        let points = cleaned.points();

        if points.iter().any(|p| p.approx_eq(target)) {
            return true;
        }

        let tolerance = tolerance
            .filter(|t| *t > 0.0)
            .unwrap_or(DEFAULT_PROXIMITY_TOLERANCE_METERS);

        match cleaned.shape() {
            Shape::Line => point_to_segment_meters(target, &points[0], &points[1]) <= tolerance,
            Shape::Polygon => point_in_ring(target, points),
            Shape::Empty | Shape::Single => false,
        }
    }

    /// Whether a circle of `radius_meters` around `target` touches the set.
    ///
    /// Null-island points are dropped first, as in [`Self::contains_point`].
    /// Checks vertices, then the segment of a line or every ring edge of a
    /// polygon, closing edge included.
    pub fn intersects_radius(&self, target: &GeoPoint, radius_meters: f64) -> bool {
        if !target.is_geo_coordinate_valid() || radius_meters.is_nan() || radius_meters <= 0.0 {
            return false;
        }

        let cleaned = self.cleaned();
        let points = cleaned.points();

        if points
            .iter()
            .any(|p| haversine_meters(target, p) <= radius_meters)
        {
            return true;
        }

        match cleaned.shape() {
            Shape::Line => point_to_segment_meters(target, &points[0], &points[1]) <= radius_meters,
            Shape::Polygon => cleaned
                .ring_edges()
                .any(|(a, b)| point_to_segment_meters(target, &a, &b) <= radius_meters),
            Shape::Empty | Shape::Single => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::distance::{DEFAULT_GEOFENCE_RADIUS_METERS, LINE_MATCH_EPSILON_METERS};

    fn set(coords: &[(f64, f64)]) -> PointSet {
        coords.iter().map(|&(lat, lon)| GeoPoint::new(lat, lon)).collect()
    }

    fn square() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 10.0),
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(10.0, 0.0),
        ]
    }

    #[test]
    fn test_point_in_ring() {
        let ring = square();
        assert!(point_in_ring(&GeoPoint::new(5.0, 5.0), &ring));
        assert!(!point_in_ring(&GeoPoint::new(15.0, 15.0), &ring));
        assert!(point_in_ring(&GeoPoint::new(0.0, 5.0), &ring));
        assert!(point_in_ring(&GeoPoint::new(0.0, 0.0), &ring));
    }

    #[test]
    fn test_point_in_ring_too_few_points() {
        let ring = vec![GeoPoint::new(1.0, 1.0), GeoPoint::new(2.0, 2.0)];
        assert!(!point_in_ring(&GeoPoint::new(1.5, 1.5), &ring));
    }

    #[test]
    fn test_contains_point_polygon() {
        let poly = set(&[(1.0, 1.0), (1.0, 9.0), (9.0, 9.0), (9.0, 1.0)]);
        assert!(poly.contains_point(&GeoPoint::new(5.0, 5.0), None));
        assert!(poly.contains_point(&GeoPoint::new(1.0, 5.0), None));
        assert!(!poly.contains_point(&GeoPoint::new(12.0, 5.0), None));
    }

    #[test]
    fn test_contains_point_vertex_match() {
        let single = set(&[(47.3769, 8.5417)]);
        assert!(single.contains_point(&GeoPoint::new(47.3769, 8.5417), None));
        assert!(single.contains_point(&GeoPoint::new(47.3769005, 8.5417), None));
        assert!(!single.contains_point(&GeoPoint::new(47.3779, 8.5417), None));
    }

    #[test]
    fn test_contains_point_line_tolerance() {
        let line = set(&[(10.0, 20.0), (10.0, 20.1)]);
        // Roughly 5.5 m north of the segment
        let near = GeoPoint::new(10.00005, 20.05);

        assert!(!line.contains_point(&near, None));
        assert!(line.contains_point(&near, Some(LINE_MATCH_EPSILON_METERS)));
        // Non-positive tolerance falls back to the tight default
        assert!(!line.contains_point(&near, Some(0.0)));
    }

    #[test]
    fn test_contains_point_ignores_zero_points() {
        let line = set(&[(0.0, 0.0), (10.0, 20.0), (10.0, 20.1)]);
        assert!(line.contains_point(&GeoPoint::new(10.0, 20.05), None));
    }

    #[test]
    fn test_contains_point_degenerate() {
        assert!(!set(&[]).contains_point(&GeoPoint::new(1.0, 1.0), None));
        assert!(!set(&[(1.0, 1.0)]).contains_point(&GeoPoint::new(2.0, 2.0), None));
        assert!(!set(&[(1.0, 1.0), (2.0, 2.0), (3.0, 1.0)])
            .contains_point(&GeoPoint::new(100.0, 1.0), None));
    }

    #[test]
    fn test_intersects_radius_vertex() {
        let poly = set(&[(40.0, -74.0), (40.0, -73.0), (41.0, -73.0)]);
        let nearby = GeoPoint::new(40.01, -74.0);
        assert!(poly.intersects_radius(&nearby, 2000.0));
        assert!(!poly.intersects_radius(&nearby, 500.0));
    }

    #[test]
    fn test_intersects_radius_closing_edge() {
        // Closing edge runs from (41, -73) back to (40, -74); target sits beside its midpoint
        let poly = set(&[(40.0, -74.0), (40.0, -73.0), (41.0, -73.0)]);
        let beside = GeoPoint::new(40.52, -73.5);
        assert!(poly.intersects_radius(&beside, DEFAULT_GEOFENCE_RADIUS_METERS));
        assert!(!poly.intersects_radius(&beside, 100.0));
    }

    #[test]
    fn test_intersects_radius_line_segment() {
        let line = set(&[(0.0, 10.0), (0.0, 11.0)]);
        let above = GeoPoint::new(0.01, 10.5);
        assert!(line.intersects_radius(&above, 1500.0));
        assert!(!line.intersects_radius(&above, 1000.0));
    }

    #[test]
    fn test_intersects_radius_ignores_zero_points() {
        // The (0,0) placeholder must not add a vertex or edges reaching null island
        let poly = set(&[(0.0, 0.0), (40.70, -74.02), (40.75, -73.97)]);
        assert!(!poly.intersects_radius(&GeoPoint::new(0.01, 0.01), DEFAULT_GEOFENCE_RADIUS_METERS));
        // Midway along the old (0,0) -> (40.70, -74.02) edge
        assert!(!poly.intersects_radius(&GeoPoint::new(20.35, -37.01), DEFAULT_GEOFENCE_RADIUS_METERS));
        // The remaining segment still counts
        assert!(poly.intersects_radius(&GeoPoint::new(40.7128, -74.0060), DEFAULT_GEOFENCE_RADIUS_METERS));
    }

    #[test]
    fn test_intersects_radius_rejects_bad_input() {
        let line = set(&[(0.0, 10.0), (0.0, 11.0)]);
        assert!(!line.intersects_radius(&GeoPoint::new(0.0, 10.0), 0.0));
        assert!(!line.intersects_radius(&GeoPoint::new(0.0, 10.0), -5.0));
        assert!(!line.intersects_radius(&GeoPoint::new(0.0, 10.0), f64::NAN));
        assert!(!line.intersects_radius(&GeoPoint::new(91.0, 10.0), 1000.0));
        assert!(!set(&[]).intersects_radius(&GeoPoint::new(1.0, 1.0), 1000.0));
    }
}
