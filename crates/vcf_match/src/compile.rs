use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vcf_ingest::NormalizedVehicleView;
use vcf_select::{FacetSelection, HierarchyLevel, HierarchySelection};

use crate::types::is_text_only_facet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct LevelCriterion {
    level: HierarchyLevel,
    /// Lower-cased selected names; any match passes the level.
    names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct FacetCriterion {
    key: String,
    /// Lower-cased selected value names; any intersection passes the facet.
    names: Vec<String>,
}

/// The two selection states compiled into executable form: a pure local
/// predicate over normalized views plus the equivalent remote
/// query-parameter mapping.
///
/// Derived, never stored: recompile whenever either selection state
/// changes. Cheap to build, a handful of lower-cased string sets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompiledFilter {
    levels: Vec<LevelCriterion>,
    facets: Vec<FacetCriterion>,
    remote_params: BTreeMap<String, String>,
}

/// Compile the current hierarchy and facet selections.
pub fn compile(hierarchy: &HierarchySelection, facets: &FacetSelection) -> CompiledFilter {
    let mut levels = Vec::new();
    let mut remote_params = BTreeMap::new();

    for level in HierarchyLevel::ALL {
        let selected = hierarchy.selected(level);
        if selected.is_empty() {
            continue;
        }
        levels.push(LevelCriterion {
            level,
            names: selected.iter().map(|e| e.name.to_lowercase()).collect(),
        });
        if let Some(csv) = hierarchy.ids_csv(level) {
            remote_params.insert(level.param_key().to_string(), csv);
        }
    }

    let mut facet_criteria = Vec::new();
    for (key, values) in facets.iter() {
        if values.is_empty() {
            continue;
        }
        facet_criteria.push(FacetCriterion {
            key: key.to_string(),
            names: values.iter().map(|v| v.name.to_lowercase()).collect(),
        });
        // Text-heuristic facets have no stable identifiers; they must be
        // applied locally after fetch, never sent as a server filter.
        if is_text_only_facet(key) {
            continue;
        }
        let ids: Vec<&str> = values.iter().filter_map(|v| v.id.as_deref()).collect();
        if !ids.is_empty() {
            remote_params.insert(key.to_string(), ids.join(","));
        }
    }

    CompiledFilter {
        levels,
        facets: facet_criteria,
        remote_params,
    }
}

impl CompiledFilter {
    /// Evaluate the predicate against one normalized view.
    ///
    /// OR within a level or facet, AND across them. A view missing a
    /// constrained hierarchy field fails that level. For the text-derived
    /// color facets an *empty* view set does not exclude the vehicle:
    /// absence of evidence is not evidence of absence.
    pub fn matches(&self, view: &NormalizedVehicleView) -> bool {
        for criterion in &self.levels {
            let Some(value) = level_value(view, criterion.level) else {
                return false;
            };
            let value = value.to_lowercase();
            if !criterion.names.iter().any(|name| *name == value) {
                return false;
            }
        }

        for criterion in &self.facets {
            match view.facet_values(&criterion.key) {
                Some(values) if !values.is_empty() => {
                    let intersects = values.iter().any(|value| {
                        let value = value.to_lowercase();
                        criterion.names.iter().any(|name| *name == value)
                    });
                    if !intersects {
                        return false;
                    }
                }
                _ => {
                    if !is_text_only_facet(&criterion.key) {
                        return false;
                    }
                }
            }
        }

        true
    }

    /// Filter a collection, preserving order.
    pub fn apply<'a>(&self, views: &'a [NormalizedVehicleView]) -> Vec<&'a NormalizedVehicleView> {
        views.iter().filter(|view| self.matches(view)).collect()
    }

    /// The same criteria expressed as remote query parameters, by identifier.
    pub fn remote_params(&self) -> &BTreeMap<String, String> {
        &self.remote_params
    }

    /// True when no level and no facet imposes a constraint.
    pub fn is_unconstrained(&self) -> bool {
        self.levels.is_empty() && self.facets.is_empty()
    }

    /// Consume the filter into a boxed pure predicate.
    pub fn into_predicate(self) -> Box<dyn Fn(&NormalizedVehicleView) -> bool + Send + Sync> {
        Box::new(move |view| self.matches(view))
    }
}

fn level_value(view: &NormalizedVehicleView, level: HierarchyLevel) -> Option<&str> {
    match level {
        HierarchyLevel::Brand => view.hierarchy.brand.as_deref(),
        HierarchyLevel::Model => view.hierarchy.model.as_deref(),
        HierarchyLevel::Trim => view.hierarchy.trim.as_deref(),
        HierarchyLevel::Year => view.hierarchy.year.as_deref(),
    }
}
