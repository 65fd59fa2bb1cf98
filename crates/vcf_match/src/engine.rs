use std::collections::BTreeMap;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{Level, info, warn};
use vcf_ingest::{NormalizeConfig, NormalizeStats, NormalizedVehicleView, normalize_collection};
use vcf_select::{EntityRef, FacetSelection, FacetValue, HierarchyLevel, HierarchySelection};

use crate::compile::{CompiledFilter, compile};
use crate::types::{ClientError, FetchOutcome, FetchTicket, FilterError, PageInfo, VehiclePage};

#[cfg(test)]
mod tests;

/// The remote inventory API as the engine sees it.
///
/// Transport, retry, and authentication live behind this seam; the engine
/// only shapes parameters and interprets responses.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch one page of vehicle records. `params` carries `page`, `limit`,
    /// and the projected remote filter keys.
    async fn fetch_vehicles(
        &self,
        params: &BTreeMap<String, String>,
    ) -> Result<VehiclePage, ClientError>;

    /// Fetch the selectable entities for a hierarchy level, optionally
    /// filtered by the parent level's selected identifiers.
    async fn fetch_level_options(
        &self,
        level: HierarchyLevel,
        parent_ids: Option<&str>,
    ) -> Result<Vec<EntityRef>, ClientError>;

    /// Fetch the selectable values for a facet.
    async fn fetch_facet_values(&self, facet_key: &str) -> Result<Vec<FacetValue>, ClientError>;
}

/// Runtime configuration for the filter engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Semantic version of the engine configuration.
    pub version: u32,
    /// Default page size for vehicle fetches.
    pub page_limit: u32,
    /// Normalization settings applied to every fetched batch.
    pub normalize: NormalizeConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: 1,
            page_limit: 20,
            normalize: NormalizeConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.version == 0 {
            return Err(FilterError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        if self.page_limit == 0 {
            return Err(FilterError::InvalidConfig(
                "page_limit must be greater than zero".into(),
            ));
        }
        self.normalize
            .validate()
            .map_err(|err| FilterError::InvalidConfig(err.to_string()))
    }
}

/// Orchestrates filtering: owns the selection states, the fetched
/// collection, and the generation counter that detects stale responses.
///
/// Single logical thread, cooperative: selection mutations happen on user
/// events, responses arrive as callbacks on the same thread, and the only
/// ordering hazard (an old dependent fetch racing a newer selection) is
/// resolved by tagging every fetch with the generation at issue time and
/// discarding mismatched responses on arrival. In-flight requests are never
/// aborted, merely ignored.
pub struct FilterEngine {
    cfg: EngineConfig,
    hierarchy: HierarchySelection,
    facets: FacetSelection,
    generation: u64,
    vehicles: Vec<NormalizedVehicleView>,
    page: PageInfo,
    last_stats: NormalizeStats,
    options: BTreeMap<HierarchyLevel, Vec<EntityRef>>,
    facet_values: BTreeMap<String, Vec<FacetValue>>,
}

impl FilterEngine {
    pub fn new(cfg: EngineConfig) -> Result<Self, FilterError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            hierarchy: HierarchySelection::default(),
            facets: FacetSelection::default(),
            generation: 0,
            vehicles: Vec::new(),
            page: PageInfo::default(),
            last_stats: NormalizeStats::default(),
            options: BTreeMap::new(),
            facet_values: BTreeMap::new(),
        })
    }

    /// The current selection generation. Monotonically increasing; every
    /// selection mutation bumps it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn hierarchy(&self) -> &HierarchySelection {
        &self.hierarchy
    }

    pub fn facets(&self) -> &FacetSelection {
        &self.facets
    }

    /// The most recently applied (already locally filtered) collection.
    pub fn vehicles(&self) -> &[NormalizedVehicleView] {
        &self.vehicles
    }

    pub fn page(&self) -> PageInfo {
        self.page
    }

    /// Normalization stats of the most recently applied batch.
    pub fn last_stats(&self) -> &NormalizeStats {
        &self.last_stats
    }

    /// Cached option list for a hierarchy level.
    pub fn options(&self, level: HierarchyLevel) -> &[EntityRef] {
        self.options.get(&level).map_or(&[], Vec::as_slice)
    }

    /// Cached value list for a facet.
    pub fn facet_value_options(&self, facet_key: &str) -> &[FacetValue] {
        self.facet_values
            .get(&facet_key.to_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    /// Toggle a hierarchy selection. Dependent levels' selections cascade
    /// inside [`HierarchySelection`]; their cached option lists are dropped
    /// here for the same reason. Returns the new generation.
    pub fn select_hierarchy(&mut self, level: HierarchyLevel, item: EntityRef) -> u64 {
        self.hierarchy.select(level, item);
        for dependent in level.dependents() {
            self.options.remove(dependent);
        }
        self.bump()
    }

    /// Toggle a facet selection. Returns the new generation.
    pub fn toggle_facet(&mut self, facet_key: &str, value: FacetValue) -> u64 {
        self.facets.toggle(facet_key, value);
        self.bump()
    }

    /// Clear every selection. Returns the new generation.
    pub fn reset(&mut self) -> u64 {
        self.hierarchy.reset();
        self.facets.reset();
        self.bump()
    }

    /// Compile the current selections into a predicate plus remote params.
    pub fn compiled(&self) -> CompiledFilter {
        compile(&self.hierarchy, &self.facets)
    }

    /// Apply the compiled predicate to the already-fetched collection.
    pub fn apply_local(&self) -> Vec<&NormalizedVehicleView> {
        self.compiled().apply(&self.vehicles)
    }

    /// Issue a fetch: returns the ticket that must accompany the response.
    pub fn begin_fetch(&self) -> FetchTicket {
        FetchTicket {
            generation: self.generation,
        }
    }

    /// Vehicle-list parameters for the current selections.
    pub fn vehicle_params(&self, page: u32, limit: u32) -> BTreeMap<String, String> {
        let mut params = self.compiled().remote_params().clone();
        params.insert("page".into(), page.to_string());
        params.insert("limit".into(), limit.to_string());
        params
    }

    /// Apply a vehicle fetch response issued under `ticket`.
    ///
    /// Stale tickets are discarded without touching state. Failures empty the
    /// collection instead of propagating. Applied pages are normalized
    /// (malformed records dropped) and run through the compiled predicate to
    /// enforce the facets that could not be projected remotely.
    pub fn apply_vehicle_response(
        &mut self,
        ticket: FetchTicket,
        result: Result<VehiclePage, ClientError>,
    ) -> FetchOutcome {
        let span = tracing::span!(
            Level::INFO,
            "vcf_match.apply_vehicles",
            generation = self.generation,
            ticket = ticket.generation
        );
        let _guard = span.enter();

        if ticket.generation != self.generation {
            warn!("stale_vehicle_response_discarded");
            return FetchOutcome::Stale;
        }

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                warn!(error = %err, "vehicle_fetch_failed");
                self.vehicles.clear();
                self.page = PageInfo::default();
                self.last_stats = NormalizeStats::default();
                return FetchOutcome::Unavailable;
            }
        };

        let start = Instant::now();
        let (views, stats) = match normalize_collection(page.records, &self.cfg.normalize) {
            Ok(output) => output,
            Err(err) => {
                // Only a broken config reaches here; treat it like a failed
                // fetch so the caller still gets an empty-result state.
                warn!(error = %err, "vehicle_batch_normalization_failed");
                self.vehicles.clear();
                self.page = PageInfo::default();
                self.last_stats = NormalizeStats::default();
                return FetchOutcome::Unavailable;
            }
        };

        let filter = self.compiled();
        let before = views.len();
        let kept: Vec<NormalizedVehicleView> =
            views.into_iter().filter(|v| filter.matches(v)).collect();
        let dropped = before - kept.len();

        info!(
            matched = kept.len(),
            dropped,
            rejected = stats.rejected_missing_id,
            elapsed_micros = start.elapsed().as_micros(),
            "vehicle_page_applied"
        );

        let matched = kept.len();
        self.vehicles = kept;
        self.page = page.page;
        self.last_stats = stats;
        FetchOutcome::Applied { matched, dropped }
    }

    /// Apply a hierarchy option response issued under `ticket`.
    pub fn apply_option_response(
        &mut self,
        level: HierarchyLevel,
        ticket: FetchTicket,
        result: Result<Vec<EntityRef>, ClientError>,
    ) -> FetchOutcome {
        if ticket.generation != self.generation {
            warn!(%level, ticket = ticket.generation, generation = self.generation,
                "stale_option_response_discarded");
            return FetchOutcome::Stale;
        }
        match result {
            Ok(entities) => {
                let count = entities.len();
                info!(%level, count, "level_options_applied");
                self.options.insert(level, entities);
                FetchOutcome::OptionsLoaded { count }
            }
            Err(err) => {
                // No options available, but shallower levels stay usable.
                warn!(%level, error = %err, "level_option_fetch_failed");
                self.options.insert(level, Vec::new());
                FetchOutcome::Unavailable
            }
        }
    }

    /// Apply a facet value response issued under `ticket`.
    pub fn apply_facet_value_response(
        &mut self,
        facet_key: &str,
        ticket: FetchTicket,
        result: Result<Vec<FacetValue>, ClientError>,
    ) -> FetchOutcome {
        if ticket.generation != self.generation {
            warn!(facet_key, "stale_facet_value_response_discarded");
            return FetchOutcome::Stale;
        }
        match result {
            Ok(values) => {
                let count = values.len();
                self.facet_values.insert(facet_key.to_lowercase(), values);
                FetchOutcome::OptionsLoaded { count }
            }
            Err(err) => {
                warn!(facet_key, error = %err, "facet_value_fetch_failed");
                self.facet_values.insert(facet_key.to_lowercase(), Vec::new());
                FetchOutcome::Unavailable
            }
        }
    }

    /// Fetch and apply one vehicle page through the ticket protocol.
    pub async fn refresh(
        &mut self,
        client: &dyn CatalogClient,
        page: u32,
        limit: u32,
    ) -> FetchOutcome {
        let ticket = self.begin_fetch();
        let params = self.vehicle_params(page, limit);
        let result = client.fetch_vehicles(&params).await;
        self.apply_vehicle_response(ticket, result)
    }

    /// Fetch and apply one vehicle page with the configured page size.
    pub async fn refresh_first_page(&mut self, client: &dyn CatalogClient) -> FetchOutcome {
        self.refresh(client, 1, self.cfg.page_limit).await
    }

    /// Fetch and apply the option list for a hierarchy level, filtered by
    /// the parent level's current selection.
    pub async fn load_options(
        &mut self,
        client: &dyn CatalogClient,
        level: HierarchyLevel,
    ) -> FetchOutcome {
        let ticket = self.begin_fetch();
        let parent_ids = level.parent().and_then(|p| self.hierarchy.ids_csv(p));
        let result = client.fetch_level_options(level, parent_ids.as_deref()).await;
        self.apply_option_response(level, ticket, result)
    }

    /// Fetch and apply the value list for a facet.
    pub async fn load_facet_values(
        &mut self,
        client: &dyn CatalogClient,
        facet_key: &str,
    ) -> FetchOutcome {
        let ticket = self.begin_fetch();
        let result = client.fetch_facet_values(facet_key).await;
        self.apply_facet_value_response(facet_key, ticket, result)
    }

    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}
