//! Ordered rule collection with deny priority.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::GeoFilter;
use crate::models::LocationRecord;

/// Ordered list of [`GeoFilter`] rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeoFilterSet {
    filters: Vec<GeoFilter>,
}

impl GeoFilterSet {
    pub fn new(filters: Vec<GeoFilter>) -> Self {
        Self { filters }
    }

    pub fn filters(&self) -> &[GeoFilter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn push(&mut self, filter: GeoFilter) {
        self.filters.push(filter);
    }

    /// Allow (`true`) or deny (`false`) a location against every rule.
    ///
    /// A matching deny rule rejects immediately regardless of position; a
    /// matching allow rule is remembered while the scan continues. With no
    /// allow match the result is `true` only for an empty list, so a set
    /// holding nothing but an unmatched deny rule still rejects.
    pub fn evaluate(&self, location: &LocationRecord) -> bool {
        let mut allow_matched = false;

        for (index, filter) in self.filters.iter().enumerate() {
            if !filter.requires_check() || !filter.matches(location) {
                continue;
            }

            if filter.is_deny {
                trace!(index, "deny rule matched");
                return false;
            }

            trace!(index, "allow rule matched");
            allow_matched = true;
        }

        if allow_matched {
            return true;
        }

        self.filters.is_empty()
    }
}

impl From<Vec<GeoFilter>> for GeoFilterSet {
    fn from(filters: Vec<GeoFilter>) -> Self {
        Self::new(filters)
    }
}

impl FromIterator<GeoFilter> for GeoFilterSet {
    fn from_iter<I: IntoIterator<Item = GeoFilter>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
