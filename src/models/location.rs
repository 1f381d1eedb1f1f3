//! Resolved location of a network address.

use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// Location resolved for an address.
///
/// `region` and `city` are often empty for country-level datasets; only the
/// point decides whether the record is usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// ISO 3166-1 alpha-2 country code
    pub country_code: String,
    pub is_eu: bool,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub city: String,
    pub point: GeoPoint,
    /// Address as given by the caller
    pub source_address: String,
}

impl LocationRecord {
    /// A record is usable for access decisions only when its point is
    /// practically valid.
    pub fn is_valid(&self) -> bool {
        self.point.is_practically_valid()
    }
}
