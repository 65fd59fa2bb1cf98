//! Ingest layer for VCF.
//!
//! Reconciles the three inconsistent attribute representations a raw vehicle
//! record may carry (the structured specification-value list, the flat
//! convenience fields, and colors buried in the free-text slug) into a
//! single canonical [`NormalizedVehicleView`] per vehicle. Records without an
//! identifier are rejected (logged and counted, never thrown across a batch).

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use chrono::Utc;
use thiserror::Error;
use tracing::{Level, info, warn};
use vcf_slug::{SlugColors, SlugError, extract};

mod config;
mod stats;
mod types;
mod view;

pub use config::NormalizeConfig;
pub use stats::NormalizeStats;
pub use types::{
    RawEntity, RawEntityField, RawScalar, RawSpecificationKey, RawSpecificationValue,
    RawVehicleRecord, RawYearField,
};
pub use view::{COLOR_FACET, INTERIOR_COLOR_FACET, NormalizedVehicleView, VehicleHierarchy};

/// Errors produced by the normalization layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("record has no identifier")]
    MissingId,
}

impl From<SlugError> for NormalizeError {
    fn from(err: SlugError) -> Self {
        match err {
            SlugError::InvalidConfig(msg) => NormalizeError::InvalidConfig(msg),
        }
    }
}

/// Normalize a single raw record into a canonical attribute view.
///
/// The stats collector is owned by the caller and accumulates across calls;
/// a batch pass hands one collector to every record.
pub fn normalize(
    raw: RawVehicleRecord,
    cfg: &NormalizeConfig,
    stats: &mut NormalizeStats,
) -> Result<NormalizedVehicleView, NormalizeError> {
    let start = Instant::now();
    cfg.validate()?;
    stats.total += 1;

    let record_id = raw
        .id
        .as_ref()
        .and_then(RawScalar::as_trimmed_string)
        .and_then(|id| sanitize_str(&id, cfg.strip_control_chars));
    let Some(record_id) = record_id else {
        stats.rejected_missing_id += 1;
        warn!(
            brand = ?raw.brand_name,
            slug = ?raw.slug,
            "normalize_rejected_missing_id"
        );
        return Err(NormalizeError::MissingId);
    };

    let span = tracing::span!(Level::INFO, "vcf_ingest.normalize", record_id = %record_id);
    let _guard = span.enter();

    let view = normalize_inner(raw, record_id, cfg, stats)?;
    stats.normalized += 1;
    info!(
        facet_count = view.facets.len(),
        elapsed_micros = start.elapsed().as_micros(),
        "normalize_success"
    );
    Ok(view)
}

/// Normalize a whole fetch response, dropping malformed records.
///
/// A single bad record must not abort the rest: records missing an
/// identifier are logged and counted, and the surviving views are returned
/// together with the batch's stats collector.
pub fn normalize_collection(
    records: Vec<RawVehicleRecord>,
    cfg: &NormalizeConfig,
) -> Result<(Vec<NormalizedVehicleView>, NormalizeStats), NormalizeError> {
    cfg.validate()?;

    let mut stats = NormalizeStats::default();
    let mut views = Vec::with_capacity(records.len());
    for raw in records {
        match normalize(raw, cfg, &mut stats) {
            Ok(view) => views.push(view),
            // Already logged and counted; the batch continues.
            Err(NormalizeError::MissingId) => {}
            Err(err) => return Err(err),
        }
    }

    info!(
        total = stats.total,
        normalized = stats.normalized,
        rejected = stats.rejected_missing_id,
        "normalize_batch_complete"
    );
    Ok((views, stats))
}

fn normalize_inner(
    raw: RawVehicleRecord,
    record_id: String,
    cfg: &NormalizeConfig,
    stats: &mut NormalizeStats,
) -> Result<NormalizedVehicleView, NormalizeError> {
    let strip = cfg.strip_control_chars;
    let hierarchy = VehicleHierarchy {
        brand: resolve_level(raw.brand_name.as_deref(), raw.brand.as_ref(), strip),
        model: resolve_level(raw.model_name.as_deref(), raw.model.as_ref(), strip),
        trim: resolve_level(raw.trim_name.as_deref(), raw.trim.as_ref(), strip),
        year: resolve_year(raw.year.as_ref(), raw.model_year.as_ref()),
    };

    let mut facets: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for entry in &raw.specification_values {
        let key = entry.facet_key().map(str::trim).filter(|k| !k.is_empty());
        let value = entry
            .value
            .as_deref()
            .and_then(|v| sanitize_str(v, strip));
        match (key, value) {
            (Some(key), Some(value)) => {
                facets.entry(key.to_lowercase()).or_default().insert(value);
            }
            _ => {
                stats.spec_entries_skipped += 1;
            }
        }
    }

    resolve_color_facets(&raw, &mut facets, cfg, stats)?;

    Ok(NormalizedVehicleView {
        id: record_id,
        hierarchy,
        facets,
        fetched_at: Utc::now(),
    })
}

/// Color facet precedence: specification list, then the flat `color` field
/// (exterior only), then slug extraction, then `additionalInfo` extraction.
/// Each facet takes the first source that yields anything; sources are never
/// merged, so a confident structured value is never mixed with a noisy
/// text-derived one.
fn resolve_color_facets(
    raw: &RawVehicleRecord,
    facets: &mut BTreeMap<String, BTreeSet<String>>,
    cfg: &NormalizeConfig,
    stats: &mut NormalizeStats,
) -> Result<(), NormalizeError> {
    let mut need_exterior = facet_is_empty(facets, COLOR_FACET);
    let mut need_interior = facet_is_empty(facets, INTERIOR_COLOR_FACET);
    if !need_exterior || !need_interior {
        stats.colors_from_specification += 1;
    }
    if !need_exterior && !need_interior {
        return Ok(());
    }

    if need_exterior
        && let Some(color) = raw
            .color
            .as_deref()
            .and_then(|c| sanitize_str(c, cfg.strip_control_chars))
    {
        facets
            .entry(COLOR_FACET.to_string())
            .or_default()
            .insert(color);
        stats.colors_from_flat_field += 1;
        need_exterior = false;
    }

    if need_exterior || need_interior {
        let slug_colors = extract_opt(raw.slug.as_deref(), cfg)?;
        if apply_text_colors(facets, &slug_colors, &mut need_exterior, &mut need_interior) {
            stats.colors_from_slug += 1;
        }
    }

    if need_exterior || need_interior {
        let info_colors = extract_opt(raw.additional_info.as_deref(), cfg)?;
        if apply_text_colors(facets, &info_colors, &mut need_exterior, &mut need_interior) {
            stats.colors_from_additional_info += 1;
        }
    }

    Ok(())
}

fn extract_opt(text: Option<&str>, cfg: &NormalizeConfig) -> Result<SlugColors, NormalizeError> {
    match text {
        Some(text) => Ok(extract(text, &cfg.slug)?),
        None => Ok(SlugColors::default()),
    }
}

fn apply_text_colors(
    facets: &mut BTreeMap<String, BTreeSet<String>>,
    colors: &SlugColors,
    need_exterior: &mut bool,
    need_interior: &mut bool,
) -> bool {
    let mut used = false;
    if *need_exterior && !colors.exterior.is_empty() {
        let set = facets.entry(COLOR_FACET.to_string()).or_default();
        set.extend(colors.exterior.iter().cloned());
        *need_exterior = false;
        used = true;
    }
    if *need_interior && !colors.interior.is_empty() {
        let set = facets.entry(INTERIOR_COLOR_FACET.to_string()).or_default();
        set.extend(colors.interior.iter().cloned());
        *need_interior = false;
        used = true;
    }
    used
}

fn facet_is_empty(facets: &BTreeMap<String, BTreeSet<String>>, key: &str) -> bool {
    facets.get(key).is_none_or(BTreeSet::is_empty)
}

/// Flat string beats nested entity name; absent both, the level stays unset.
fn resolve_level(
    flat: Option<&str>,
    field: Option<&RawEntityField>,
    strip_control: bool,
) -> Option<String> {
    flat.or_else(|| field.and_then(RawEntityField::flat_name))
        .and_then(|v| sanitize_str(v, strip_control))
        .or_else(|| {
            field
                .and_then(RawEntityField::nested_name)
                .and_then(|v| sanitize_str(v, strip_control))
        })
}

fn resolve_year(flat: Option<&RawYearField>, alternate: Option<&RawYearField>) -> Option<String> {
    flat.and_then(RawYearField::as_trimmed_string)
        .or_else(|| alternate.and_then(RawYearField::as_trimmed_string))
}

fn sanitize_str(value: &str, strip_control: bool) -> Option<String> {
    let filtered = if strip_control {
        value.chars().filter(|c| !c.is_control()).collect::<String>()
    } else {
        value.to_string()
    };
    let trimmed = filtered.trim().to_string();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}
