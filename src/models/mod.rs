//! Core data models for the geofencing engine.

pub mod location;
pub mod point;
pub mod point_set;

pub use location::LocationRecord;
pub use point::GeoPoint;
pub use point_set::{PointSet, Shape};
