use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One selectable facet value. The identifier is optional: values discovered
/// through lookup endpoints carry one, values derived from text heuristics
/// (colors) do not, and only identifier-backed values can be projected into
/// remote query parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetValue {
    pub id: Option<String>,
    pub name: String,
}

impl FacetValue {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
        }
    }

    /// A value known only by name, never projected remotely.
    pub fn unbacked(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

/// The user's per-facet selected value sets, independent of the hierarchy.
///
/// Facets are mutually independent: toggling a value in one facet never
/// touches another. Value membership is keyed by case-insensitive name, so
/// `Hybrid` and `hybrid` are the same selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetSelection {
    facets: BTreeMap<String, Vec<FacetValue>>,
}

impl FacetSelection {
    /// Toggle a value in a facet's selection set.
    ///
    /// Returns `true` when the value was added, `false` when removed.
    pub fn toggle(&mut self, facet_key: &str, value: FacetValue) -> bool {
        let key = facet_key.trim().to_lowercase();
        let values = self.facets.entry(key.clone()).or_default();
        if let Some(pos) = values
            .iter()
            .position(|v| v.name.eq_ignore_ascii_case(&value.name))
        {
            values.remove(pos);
            if values.is_empty() {
                self.facets.remove(&key);
            }
            false
        } else {
            values.push(value);
            true
        }
    }

    /// Clear every facet.
    pub fn reset(&mut self) {
        self.facets.clear();
    }

    /// Selected values for a facet, in selection order.
    pub fn selected(&self, facet_key: &str) -> &[FacetValue] {
        self.facets
            .get(&facet_key.trim().to_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    /// Iterate over facets with a non-empty selection.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FacetValue])> {
        self.facets
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_then_removes_case_insensitively() {
        let mut sel = FacetSelection::default();
        assert!(sel.toggle("fuel_type", FacetValue::new("3", "Hybrid")));
        assert_eq!(sel.selected("fuel_type").len(), 1);

        assert!(!sel.toggle("Fuel_Type", FacetValue::new("3", "HYBRID")));
        assert!(sel.selected("fuel_type").is_empty());
        assert!(sel.is_empty());
    }

    #[test]
    fn facets_are_mutually_independent() {
        let mut sel = FacetSelection::default();
        sel.toggle("fuel_type", FacetValue::new("3", "Hybrid"));
        sel.toggle("transmission", FacetValue::new("1", "Automatic"));

        sel.toggle("fuel_type", FacetValue::new("3", "Hybrid"));

        assert!(sel.selected("fuel_type").is_empty());
        assert_eq!(sel.selected("transmission").len(), 1);
    }

    #[test]
    fn reset_clears_all_facets() {
        let mut sel = FacetSelection::default();
        sel.toggle("color", FacetValue::unbacked("Red"));
        sel.toggle("body_type", FacetValue::new("2", "SUV"));
        sel.reset();
        assert!(sel.is_empty());
    }

    #[test]
    fn selection_order_is_preserved() {
        let mut sel = FacetSelection::default();
        sel.toggle("fuel_type", FacetValue::new("5", "Electric"));
        sel.toggle("fuel_type", FacetValue::new("3", "Hybrid"));
        let names: Vec<&str> = sel
            .selected("fuel_type")
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(names, vec!["Electric", "Hybrid"]);
    }
}
