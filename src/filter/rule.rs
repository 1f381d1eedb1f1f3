//! A single allow/deny geofencing rule.

use serde::{Deserialize, Serialize};

use crate::geometry::DEFAULT_GEOFENCE_RADIUS_METERS;
use crate::models::{LocationRecord, PointSet};

/// One allow or deny rule over country/region/city lists and an optional
/// polygon boundary.
///
/// Evaluation only borrows the rule; publish it behind an `Arc` and use
/// `clone` to prepare updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoFilter {
    pub is_deny: bool,
    pub countries: Vec<String>,
    pub regions: Vec<String>,
    pub cities: Vec<String>,
    pub polygon: PointSet,
}

/// Trimmed, case-insensitive membership. Folds non-ASCII letters too, since
/// dataset names such as "Zürich" or "São Paulo" are not plain ASCII.
fn list_contains(list: &[String], value: &str) -> bool {
    let value = value.trim().to_lowercase();
    list.iter().any(|item| item.trim().to_lowercase() == value)
}

impl GeoFilter {
    pub fn allow() -> Self {
        Self::default()
    }

    pub fn deny() -> Self {
        Self {
            is_deny: true,
            ..Default::default()
        }
    }

    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = countries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cities<I, S>(mut self, cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cities = cities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_polygon(mut self, polygon: impl Into<PointSet>) -> Self {
        self.polygon = polygon.into();
        self
    }

    /// Whether the rule carries any criterion at all.
    pub fn requires_check(&self) -> bool {
        !self.countries.is_empty()
            || !self.regions.is_empty()
            || !self.cities.is_empty()
            || self.polygon.cleaned().is_multipoint()
    }

    /// Whether the location satisfies every criterion the rule defines.
    ///
    /// Lists are ANDed with each other and ORed within themselves. The
    /// polygon matches fuzzily within [`DEFAULT_GEOFENCE_RADIUS_METERS`].
    /// Invalid locations match nothing.
    pub fn matches(&self, location: &LocationRecord) -> bool {
        if !location.is_valid() {
            return false;
        }

        if !self.countries.is_empty() && !list_contains(&self.countries, &location.country_code) {
            return false;
        }
        if !self.regions.is_empty() && !list_contains(&self.regions, &location.region) {
            return false;
        }
        if !self.cities.is_empty() && !list_contains(&self.cities, &location.city) {
            return false;
        }

        if self.polygon.cleaned().is_multipoint()
            && !self
                .polygon
                .intersects_radius(&location.point, DEFAULT_GEOFENCE_RADIUS_METERS)
        {
            return false;
        }

        true
    }

    /// Final allow (`true`) or reject (`false`) decision of this rule alone.
    pub fn geo_check(&self, location: &LocationRecord) -> bool {
        if !self.requires_check() {
            return true;
        }

        let matched = self.matches(location);
        if self.is_deny {
            !matched
        } else {
            matched
        }
    }
}
