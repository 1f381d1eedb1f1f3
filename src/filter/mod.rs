//! Allow/deny geofencing rules.
//!
//! A [`GeoFilter`] is a single rule; a [`GeoFilterSet`] combines rules with
//! deny priority.

mod rule;
mod set;

pub use rule::GeoFilter;
pub use set::GeoFilterSet;
