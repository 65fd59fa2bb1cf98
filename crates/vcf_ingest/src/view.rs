use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Facet key under which exterior colors are stored.
pub const COLOR_FACET: &str = "color";
/// Facet key under which interior colors are stored.
pub const INTERIOR_COLOR_FACET: &str = "interior_color";

/// Canonical hierarchy attributes of one vehicle.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VehicleHierarchy {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub trim: Option<String>,
    pub year: Option<String>,
}

/// The canonical, source-agnostic attribute view of one vehicle.
///
/// Built once per record when a fetch response is ingested and never updated
/// in place; a replaced collection discards its views wholesale. Facet values
/// keep their original display casing; all matching against them is done
/// case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedVehicleView {
    pub id: String,
    pub hierarchy: VehicleHierarchy,
    /// Facet key (lower-cased) to the set of values the vehicle carries.
    pub facets: BTreeMap<String, BTreeSet<String>>,
    /// Ingest timestamp of the batch this view belongs to.
    pub fetched_at: DateTime<Utc>,
}

impl NormalizedVehicleView {
    /// Values the vehicle carries for a facet, if any were derived.
    pub fn facet_values(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.facets.get(key)
    }

    /// True when no source produced a value for the facet.
    pub fn facet_is_empty(&self, key: &str) -> bool {
        self.facets.get(key).is_none_or(BTreeSet::is_empty)
    }

    /// Case-insensitive membership test against a facet's value set.
    pub fn facet_contains(&self, key: &str, value: &str) -> bool {
        self.facets
            .get(key)
            .is_some_and(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
    }
}
