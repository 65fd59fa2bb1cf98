use serde::{Deserialize, Serialize};
use thiserror::Error;
use vcf_ingest::{COLOR_FACET, INTERIOR_COLOR_FACET, NormalizeError, RawVehicleRecord};

/// Facets whose values come from text heuristics and carry no stable remote
/// identifier. They are never projected into remote query parameters and are
/// enforced locally after every fetch.
pub const TEXT_ONLY_FACETS: [&str; 2] = [COLOR_FACET, INTERIOR_COLOR_FACET];

/// Whether a facet must be applied locally rather than projected remotely.
pub fn is_text_only_facet(key: &str) -> bool {
    TEXT_ONLY_FACETS.iter().any(|f| f.eq_ignore_ascii_case(key))
}

/// Errors produced by the filtering layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid filter config: {0}")]
    InvalidConfig(String),
    #[error("normalization error: {0}")]
    Normalize(#[from] NormalizeError),
}

/// Errors a [`CatalogClient`](crate::CatalogClient) implementation may
/// surface. The engine catches these at its boundary and turns them into
/// empty-result states; they never propagate past it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Pagination metadata as the vehicle list endpoint reports it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageInfo {
    #[serde(default, alias = "currentPage")]
    pub current_page: u32,
    #[serde(default, alias = "totalPages")]
    pub total_pages: u32,
    #[serde(default, alias = "totalItems")]
    pub total_items: u64,
}

/// One page of raw vehicle records plus pagination metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VehiclePage {
    #[serde(default, alias = "items", alias = "data")]
    pub records: Vec<RawVehicleRecord>,
    #[serde(default, flatten)]
    pub page: PageInfo,
}

/// Generation tag handed out when a fetch is issued.
///
/// The engine compares the ticket against its current generation when the
/// response arrives; a mismatch means a newer selection superseded the fetch
/// and the response must be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub(crate) generation: u64,
}

impl FetchTicket {
    /// The generation at issue time.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Outcome of applying a fetch response to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A vehicle page was applied; `matched` survived the local predicate,
    /// `dropped` were filtered out by facets that could not be projected.
    Applied { matched: usize, dropped: usize },
    /// An option or facet-value list was applied.
    OptionsLoaded { count: usize },
    /// The response was issued under an older generation and discarded.
    Stale,
    /// The fetch failed; the affected list is now empty. Not an error:
    /// callers render an empty-result state and the rest stays usable.
    Unavailable,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn vehicle_page_decodes_wire_casing() {
        let page: VehiclePage = serde_json::from_value(json!({
            "items": [{"id": 1, "brandName": "Kia"}],
            "currentPage": 2,
            "totalPages": 7,
            "totalItems": 130
        }))
        .expect("page decodes");
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.page.current_page, 2);
        assert_eq!(page.page.total_items, 130);
    }

    #[test]
    fn text_only_facets_cover_both_color_keys() {
        assert!(is_text_only_facet("color"));
        assert!(is_text_only_facet("Interior_Color"));
        assert!(!is_text_only_facet("fuel_type"));
    }
}
