//! Umbrella crate for Vehicle Catalog Filtering (VCF).
//!
//! Stitches the stage crates together so callers can go from a raw inventory
//! fetch response to a filtered collection with a single API entry point:
//!
//! - `vcf_slug`: color-term extraction from free-text slugs;
//! - `vcf_ingest`: normalization of heterogeneous raw records into
//!   canonical attribute views;
//! - `vcf_select`: hierarchy and facet selection state;
//! - `vcf_match`: predicate compilation, remote parameter projection, and
//!   the stale-safe [`FilterEngine`].
//!
//! ```
//! use vcf::{
//!     EntityRef, FacetSelection, HierarchyLevel, HierarchySelection, NormalizeConfig, compile,
//!     normalize_and_filter,
//! };
//!
//! let records = vcf::decode_records(
//!     r#"[
//!         {"id": 1, "brandName": "Toyota", "slug": "corolla-white-body"},
//!         {"id": 2, "brandName": "Honda", "slug": "civic-red-body"},
//!         {"brandName": "no-identifier"}
//!     ]"#,
//! )
//! .expect("records decode");
//!
//! let mut hierarchy = HierarchySelection::default();
//! hierarchy.select(HierarchyLevel::Brand, EntityRef::new("1", "Toyota"));
//! let facets = FacetSelection::default();
//!
//! let (views, stats) =
//!     normalize_and_filter(records, &hierarchy, &facets, &NormalizeConfig::default())
//!         .expect("pipeline succeeds");
//!
//! assert_eq!(views.len(), 1);
//! assert_eq!(stats.rejected_missing_id, 1);
//! assert!(compile(&hierarchy, &facets).remote_params().contains_key("brandId"));
//! ```

use thiserror::Error;

mod config;

pub use config::{ConfigLoadError, EngineYamlConfig, NormalizeYamlConfig, VcfConfig};
pub use vcf_ingest::{
    COLOR_FACET, INTERIOR_COLOR_FACET, NormalizeConfig, NormalizeError, NormalizeStats,
    NormalizedVehicleView, RawEntity, RawEntityField, RawScalar, RawSpecificationValue,
    RawVehicleRecord, RawYearField, VehicleHierarchy, normalize, normalize_collection,
};
pub use vcf_match::{
    CatalogClient, ClientError, CompiledFilter, EngineConfig, FetchOutcome, FetchTicket,
    FilterEngine, FilterError, PageInfo, TEXT_ONLY_FACETS, VehiclePage, compile,
    is_text_only_facet,
};
pub use vcf_select::{
    EntityRef, FacetSelection, FacetValue, HierarchyLevel, HierarchySelection, SelectionError,
};
pub use vcf_slug::{SlugColors, SlugConfig, SlugError, extract, segment_words};

/// Errors that can occur while running raw records through the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("decode failure: {0}")]
    Decode(String),
    #[error("normalization failure: {0}")]
    Normalize(#[from] NormalizeError),
    #[error("extraction failure: {0}")]
    Slug(#[from] SlugError),
    #[error("filter failure: {0}")]
    Filter(#[from] FilterError),
}

/// Decode a JSON array of raw vehicle records.
pub fn decode_records(json: &str) -> Result<Vec<RawVehicleRecord>, PipelineError> {
    serde_json::from_str(json).map_err(|err| PipelineError::Decode(err.to_string()))
}

/// One-shot pipeline: normalize a raw batch (dropping malformed records) and
/// apply the compiled filter for the given selections.
///
/// Returns the surviving views and the batch's stats collector. For the
/// incremental, fetch-orchestrating flow use [`FilterEngine`] instead.
pub fn normalize_and_filter(
    records: Vec<RawVehicleRecord>,
    hierarchy: &HierarchySelection,
    facets: &FacetSelection,
    cfg: &NormalizeConfig,
) -> Result<(Vec<NormalizedVehicleView>, NormalizeStats), PipelineError> {
    let (views, stats) = normalize_collection(records, cfg)?;
    let filter = compile(hierarchy, facets);
    let kept = views.into_iter().filter(|v| filter.matches(v)).collect();
    Ok((kept, stats))
}
