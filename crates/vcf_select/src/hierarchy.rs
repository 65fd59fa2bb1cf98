use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SelectionError;

/// One level of the brand → model → trim (+ year) hierarchy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyLevel {
    Brand,
    Model,
    Trim,
    Year,
}

impl HierarchyLevel {
    /// All levels, shallowest first.
    pub const ALL: [HierarchyLevel; 4] = [
        HierarchyLevel::Brand,
        HierarchyLevel::Model,
        HierarchyLevel::Trim,
        HierarchyLevel::Year,
    ];

    /// Remote query-parameter key for this level's selected identifiers.
    pub fn param_key(self) -> &'static str {
        match self {
            HierarchyLevel::Brand => "brandId",
            HierarchyLevel::Model => "modelId",
            HierarchyLevel::Trim => "trimId",
            HierarchyLevel::Year => "year",
        }
    }

    /// Levels whose valid options depend on this level's selection and must
    /// therefore be cleared when it mutates. Year options are not filtered by
    /// the chain upstream, so year never appears here.
    pub fn dependents(self) -> &'static [HierarchyLevel] {
        match self {
            HierarchyLevel::Brand => &[HierarchyLevel::Model, HierarchyLevel::Trim],
            HierarchyLevel::Model => &[HierarchyLevel::Trim],
            HierarchyLevel::Trim | HierarchyLevel::Year => &[],
        }
    }

    /// The level whose selection filters this level's option lookups.
    pub fn parent(self) -> Option<HierarchyLevel> {
        match self {
            HierarchyLevel::Brand | HierarchyLevel::Year => None,
            HierarchyLevel::Model => Some(HierarchyLevel::Brand),
            HierarchyLevel::Trim => Some(HierarchyLevel::Model),
        }
    }
}

impl fmt::Display for HierarchyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HierarchyLevel::Brand => "brand",
            HierarchyLevel::Model => "model",
            HierarchyLevel::Trim => "trim",
            HierarchyLevel::Year => "year",
        };
        f.write_str(name)
    }
}

impl FromStr for HierarchyLevel {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brand" => Ok(HierarchyLevel::Brand),
            "model" => Ok(HierarchyLevel::Model),
            "trim" => Ok(HierarchyLevel::Trim),
            "year" => Ok(HierarchyLevel::Year),
            other => Err(SelectionError::UnknownLevel(other.to_string())),
        }
    }
}

/// An `{id, name}` pair as returned by the hierarchy lookup endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct EntityRef {
    pub id: String,
    pub name: String,
}

impl EntityRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// The user's current brand/model/trim/year selections.
///
/// Mutated only through [`select`](HierarchySelection::select) and
/// [`reset`](HierarchySelection::reset). Mutating a level clears every
/// dependent level before anything else can observe the new value, so no
/// inconsistent combination (a model belonging to a deselected brand) is ever
/// reachable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HierarchySelection {
    brand: BTreeSet<EntityRef>,
    model: BTreeSet<EntityRef>,
    trim: BTreeSet<EntityRef>,
    year: BTreeSet<EntityRef>,
}

impl HierarchySelection {
    /// Toggle an item in a level's selection set.
    ///
    /// Returns `true` when the item was added, `false` when it was removed.
    /// Either way the net effect mutates the level, so every dependent level
    /// is cleared.
    pub fn select(&mut self, level: HierarchyLevel, item: EntityRef) -> bool {
        let set = self.level_mut(level);
        let added = if set.remove(&item) {
            false
        } else {
            set.insert(item);
            true
        };
        for dependent in level.dependents() {
            self.level_mut(*dependent).clear();
        }
        added
    }

    /// Clear every level.
    pub fn reset(&mut self) {
        for level in HierarchyLevel::ALL {
            self.level_mut(level).clear();
        }
    }

    /// The current selection set at a level.
    pub fn selected(&self, level: HierarchyLevel) -> &BTreeSet<EntityRef> {
        match level {
            HierarchyLevel::Brand => &self.brand,
            HierarchyLevel::Model => &self.model,
            HierarchyLevel::Trim => &self.trim,
            HierarchyLevel::Year => &self.year,
        }
    }

    /// Comma-joined selected identifiers for a level, `None` when empty.
    pub fn ids_csv(&self, level: HierarchyLevel) -> Option<String> {
        let set = self.selected(level);
        if set.is_empty() {
            return None;
        }
        Some(
            set.iter()
                .map(|item| item.id.as_str())
                .collect::<Vec<_>>()
                .join(","),
        )
    }

    pub fn is_empty(&self) -> bool {
        HierarchyLevel::ALL
            .iter()
            .all(|level| self.selected(*level).is_empty())
    }

    fn level_mut(&mut self, level: HierarchyLevel) -> &mut BTreeSet<EntityRef> {
        match level {
            HierarchyLevel::Brand => &mut self.brand,
            HierarchyLevel::Model => &mut self.model,
            HierarchyLevel::Trim => &mut self.trim,
            HierarchyLevel::Year => &mut self.year,
        }
    }
}
