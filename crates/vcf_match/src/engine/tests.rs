use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use vcf_select::{EntityRef, FacetValue, HierarchyLevel};

use super::*;

fn engine() -> FilterEngine {
    FilterEngine::new(EngineConfig::default()).expect("default config is valid")
}

fn page_from(value: serde_json::Value) -> VehiclePage {
    serde_json::from_value(value).expect("page decodes")
}

#[test]
fn zero_page_limit_rejected() {
    let cfg = EngineConfig {
        page_limit: 0,
        ..Default::default()
    };
    assert!(matches!(
        FilterEngine::new(cfg),
        Err(FilterError::InvalidConfig(_))
    ));
}

#[test]
fn selection_mutations_bump_generation() {
    let mut engine = engine();
    assert_eq!(engine.generation(), 0);
    let g1 = engine.select_hierarchy(HierarchyLevel::Brand, EntityRef::new("1", "Toyota"));
    let g2 = engine.toggle_facet("fuel_type", FacetValue::new("3", "Hybrid"));
    let g3 = engine.reset();
    assert_eq!((g1, g2, g3), (1, 2, 3));
}

#[test]
fn stale_vehicle_response_is_discarded() {
    let mut engine = engine();
    engine.select_hierarchy(HierarchyLevel::Brand, EntityRef::new("1", "Toyota"));

    let ticket = engine.begin_fetch();
    // A newer selection supersedes the in-flight fetch.
    engine.select_hierarchy(HierarchyLevel::Brand, EntityRef::new("2", "Honda"));

    let outcome = engine.apply_vehicle_response(
        ticket,
        Ok(page_from(json!({"items": [{"id": 1, "brandName": "Toyota"}]}))),
    );
    assert_eq!(outcome, FetchOutcome::Stale);
    assert!(engine.vehicles().is_empty());
}

#[test]
fn stale_option_response_is_discarded_and_fresh_one_applied() {
    let mut engine = engine();
    engine.select_hierarchy(HierarchyLevel::Brand, EntityRef::new("1", "Toyota"));

    // Model lookup for brand A issued, then the user switches to brand B.
    let stale_ticket = engine.begin_fetch();
    engine.select_hierarchy(HierarchyLevel::Brand, EntityRef::new("2", "Honda"));

    let fresh_ticket = engine.begin_fetch();
    let fresh = engine.apply_option_response(
        HierarchyLevel::Model,
        fresh_ticket,
        Ok(vec![EntityRef::new("20", "Civic")]),
    );
    assert_eq!(fresh, FetchOutcome::OptionsLoaded { count: 1 });

    // Brand A's slow response arrives last and must not win.
    let stale = engine.apply_option_response(
        HierarchyLevel::Model,
        stale_ticket,
        Ok(vec![EntityRef::new("10", "Corolla")]),
    );
    assert_eq!(stale, FetchOutcome::Stale);
    assert_eq!(engine.options(HierarchyLevel::Model), [EntityRef::new("20", "Civic")]);
}

#[test]
fn failed_fetch_becomes_empty_result_state() {
    let mut engine = engine();
    let ticket = engine.begin_fetch();
    let outcome = engine.apply_vehicle_response(
        ticket,
        Err(ClientError::Transport("connection reset".into())),
    );
    assert_eq!(outcome, FetchOutcome::Unavailable);
    assert!(engine.vehicles().is_empty());

    let ticket = engine.begin_fetch();
    let outcome = engine.apply_option_response(
        HierarchyLevel::Model,
        ticket,
        Err(ClientError::Decode("truncated body".into())),
    );
    assert_eq!(outcome, FetchOutcome::Unavailable);
    assert!(engine.options(HierarchyLevel::Model).is_empty());
}

#[test]
fn applied_page_is_filtered_by_unprojectable_facets() {
    let mut engine = engine();
    engine.toggle_facet("color", FacetValue::unbacked("Red"));

    let ticket = engine.begin_fetch();
    let outcome = engine.apply_vehicle_response(
        ticket,
        Ok(page_from(json!({
            "items": [
                {"id": 1, "slug": "corolla-red-body-inside-black"},
                {"id": 2, "slug": "corolla-blue-body-inside-black"},
                {"id": 3, "slug": "corolla-mystery"}
            ],
            "currentPage": 1, "totalPages": 1, "totalItems": 3
        }))),
    );

    // Red matches; blue is excluded; the color-less record survives under
    // the non-exclusion policy.
    assert_eq!(outcome, FetchOutcome::Applied { matched: 2, dropped: 1 });
    let ids: Vec<&str> = engine.vehicles().iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert_eq!(engine.page().total_items, 3);
}

#[test]
fn malformed_records_are_dropped_and_counted() {
    let mut engine = engine();
    let ticket = engine.begin_fetch();
    let outcome = engine.apply_vehicle_response(
        ticket,
        Ok(page_from(json!({
            "items": [{"id": 1}, {"brandName": "no-id"}, {"id": 3}]
        }))),
    );
    assert_eq!(outcome, FetchOutcome::Applied { matched: 2, dropped: 0 });
    assert_eq!(engine.last_stats().rejected_missing_id, 1);
}

#[test]
fn brand_change_drops_dependent_option_caches() {
    let mut engine = engine();
    engine.select_hierarchy(HierarchyLevel::Brand, EntityRef::new("1", "Toyota"));
    let ticket = engine.begin_fetch();
    engine.apply_option_response(
        HierarchyLevel::Model,
        ticket,
        Ok(vec![EntityRef::new("10", "Corolla")]),
    );
    assert_eq!(engine.options(HierarchyLevel::Model).len(), 1);

    engine.select_hierarchy(HierarchyLevel::Brand, EntityRef::new("2", "Honda"));
    assert!(engine.options(HierarchyLevel::Model).is_empty());
}

#[test]
fn vehicle_params_carry_page_limit_and_projection() {
    let mut engine = engine();
    engine.select_hierarchy(HierarchyLevel::Brand, EntityRef::new("1", "Toyota"));
    engine.toggle_facet("color", FacetValue::unbacked("Red"));

    let params = engine.vehicle_params(2, 50);
    assert_eq!(params.get("page").map(String::as_str), Some("2"));
    assert_eq!(params.get("limit").map(String::as_str), Some("50"));
    assert_eq!(params.get("brandId").map(String::as_str), Some("1"));
    assert!(!params.contains_key("color"));
}

/// Scripted client: serves canned pages and records the lookups it saw.
struct ScriptedClient {
    page: VehiclePage,
    options: Vec<EntityRef>,
    seen_parent_ids: Mutex<Vec<Option<String>>>,
}

impl ScriptedClient {
    fn new(page: VehiclePage, options: Vec<EntityRef>) -> Self {
        Self {
            page,
            options,
            seen_parent_ids: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CatalogClient for ScriptedClient {
    async fn fetch_vehicles(
        &self,
        _params: &BTreeMap<String, String>,
    ) -> Result<VehiclePage, ClientError> {
        Ok(self.page.clone())
    }

    async fn fetch_level_options(
        &self,
        _level: HierarchyLevel,
        parent_ids: Option<&str>,
    ) -> Result<Vec<EntityRef>, ClientError> {
        self.seen_parent_ids
            .lock()
            .expect("lock poisoned")
            .push(parent_ids.map(str::to_string));
        Ok(self.options.clone())
    }

    async fn fetch_facet_values(&self, _facet_key: &str) -> Result<Vec<FacetValue>, ClientError> {
        Ok(vec![FacetValue::new("3", "Hybrid")])
    }
}

#[tokio::test]
async fn refresh_fetches_normalizes_and_filters() {
    let client = ScriptedClient::new(
        page_from(json!({
            "items": [
                {"id": 1, "brandName": "Toyota"},
                {"id": 2, "brandName": "Honda"}
            ],
            "currentPage": 1, "totalPages": 1, "totalItems": 2
        })),
        Vec::new(),
    );

    let mut engine = engine();
    engine.select_hierarchy(HierarchyLevel::Brand, EntityRef::new("1", "Toyota"));
    let outcome = engine.refresh_first_page(&client).await;

    assert_eq!(outcome, FetchOutcome::Applied { matched: 1, dropped: 1 });
    assert_eq!(engine.vehicles()[0].hierarchy.brand.as_deref(), Some("Toyota"));
}

#[tokio::test]
async fn load_options_passes_parent_selection() {
    let client = ScriptedClient::new(
        VehiclePage::default(),
        vec![EntityRef::new("10", "Corolla"), EntityRef::new("11", "Camry")],
    );

    let mut engine = engine();
    engine.select_hierarchy(HierarchyLevel::Brand, EntityRef::new("1", "Toyota"));
    let outcome = engine.load_options(&client, HierarchyLevel::Model).await;

    assert_eq!(outcome, FetchOutcome::OptionsLoaded { count: 2 });
    assert_eq!(engine.options(HierarchyLevel::Model).len(), 2);
    let seen = client.seen_parent_ids.lock().expect("lock poisoned");
    assert_eq!(seen.as_slice(), [Some("1".to_string())]);
}

#[tokio::test]
async fn load_facet_values_caches_by_key() {
    let client = ScriptedClient::new(VehiclePage::default(), Vec::new());
    let mut engine = engine();
    let outcome = engine.load_facet_values(&client, "Fuel_Type").await;
    assert_eq!(outcome, FetchOutcome::OptionsLoaded { count: 1 });
    assert_eq!(engine.facet_value_options("fuel_type").len(), 1);
}
