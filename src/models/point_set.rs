//! Ordered point sequences and their derived shape.

use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// Shape implied by the number of points in a [`PointSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Empty,
    Single,
    /// Exactly two points, a single segment
    Line,
    /// Three or more points, ring implicitly closed
    Polygon,
}

impl Shape {
    pub fn from_len(len: usize) -> Self {
        match len {
            0 => Shape::Empty,
            1 => Shape::Single,
            2 => Shape::Line,
            _ => Shape::Polygon,
        }
    }

    /// Two or more points: the set carries an actual shape.
    pub fn is_multipoint(&self) -> bool {
        matches!(self, Shape::Line | Shape::Polygon)
    }
}

/// Ordered sequence of points, interpreted by length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointSet {
    points: Vec<GeoPoint>,
}

impl PointSet {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, point: GeoPoint) {
        self.points.push(point);
    }

    /// Copy without null-island placeholders.
    pub fn cleaned(&self) -> PointSet {
        PointSet {
            points: self.points.iter().filter(|p| !p.is_zero()).copied().collect(),
        }
    }

    /// Shape of the set as stored (not cleaned).
    pub fn shape(&self) -> Shape {
        Shape::from_len(self.points.len())
    }

    pub fn is_single(&self) -> bool {
        self.shape() == Shape::Single
    }

    pub fn is_line(&self) -> bool {
        self.shape() == Shape::Line
    }

    pub fn is_polygon(&self) -> bool {
        self.shape() == Shape::Polygon
    }

    pub fn is_multipoint(&self) -> bool {
        self.shape().is_multipoint()
    }

    /// Ring edges in order, including the closing edge back to the first vertex.
    ///
    /// Only meaningful for polygons; other shapes yield no edges.
    pub fn ring_edges(&self) -> impl Iterator<Item = (GeoPoint, GeoPoint)> + '_ {
        let n = if self.is_polygon() { self.points.len() } else { 0 };
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }
}

impl From<Vec<GeoPoint>> for PointSet {
    fn from(points: Vec<GeoPoint>) -> Self {
        Self::new(points)
    }
}

impl FromIterator<GeoPoint> for PointSet {
    fn from_iter<I: IntoIterator<Item = GeoPoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
