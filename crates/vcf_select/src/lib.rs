//! Selection state for VCF.
//!
//! Two small state machines: [`HierarchySelection`] holds brand/model/trim/
//! year choices with cascading invalidation of dependent levels, and
//! [`FacetSelection`] holds independent per-facet value sets. Both mutate
//! only through their toggle operation plus an explicit reset, and both are
//! plain data; compiling them into a predicate or query parameters lives in
//! `vcf_match`.

use thiserror::Error;

mod facet;
mod hierarchy;

pub use facet::{FacetSelection, FacetValue};
pub use hierarchy::{EntityRef, HierarchyLevel, HierarchySelection};

/// Errors produced by the selection layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("unknown hierarchy level: {0}")]
    UnknownLevel(String),
}
