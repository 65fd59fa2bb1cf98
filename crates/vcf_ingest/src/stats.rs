use serde::{Deserialize, Serialize};

/// Counters accumulated over one normalization pass.
///
/// The collector is owned by the caller: it is created fresh per batch and
/// returned alongside the views, so no cross-request state hides inside the
/// module.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizeStats {
    /// Records seen, valid or not.
    pub total: usize,
    /// Records that produced a normalized view.
    pub normalized: usize,
    /// Records dropped for lacking an identifier.
    pub rejected_missing_id: usize,
    /// Specification-value entries skipped for missing key or value.
    pub spec_entries_skipped: usize,
    /// Vehicles whose color facets came from the specification list.
    pub colors_from_specification: usize,
    /// Vehicles whose exterior color came from the flat `color` field.
    pub colors_from_flat_field: usize,
    /// Vehicles with at least one color derived from the slug.
    pub colors_from_slug: usize,
    /// Vehicles with at least one color derived from `additionalInfo`.
    pub colors_from_additional_info: usize,
}

impl NormalizeStats {
    /// Fold another batch's counters into this one.
    pub fn merge(&mut self, other: &NormalizeStats) {
        self.total += other.total;
        self.normalized += other.normalized;
        self.rejected_missing_id += other.rejected_missing_id;
        self.spec_entries_skipped += other.spec_entries_skipped;
        self.colors_from_specification += other.colors_from_specification;
        self.colors_from_flat_field += other.colors_from_flat_field;
        self.colors_from_slug += other.colors_from_slug;
        self.colors_from_additional_info += other.colors_from_additional_info;
    }
}
