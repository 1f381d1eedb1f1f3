//! Geofence - IP geolocation and allow/deny geofencing rules
//!
//! This library provides the geometry, rule engine and location resolver
//! used by the `geofence` server binary.

pub mod config;
pub mod filter;
pub mod geometry;
pub mod models;
pub mod resolver;

pub use filter::{GeoFilter, GeoFilterSet};
pub use models::{GeoPoint, LocationRecord, PointSet, Shape};
pub use resolver::{LocationResolver, ResolverError};
