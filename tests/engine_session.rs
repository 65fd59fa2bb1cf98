use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use vcf::{
    CatalogClient, ClientError, EngineConfig, EntityRef, FacetValue, FetchOutcome, FilterEngine,
    HierarchyLevel, VehiclePage,
};

/// Client that serves canned pages in order and records every parameter map
/// it was called with.
struct ReplayClient {
    pages: Mutex<Vec<Result<VehiclePage, ClientError>>>,
    seen_params: Mutex<Vec<BTreeMap<String, String>>>,
}

impl ReplayClient {
    fn new(pages: Vec<Result<VehiclePage, ClientError>>) -> Self {
        Self {
            pages: Mutex::new(pages),
            seen_params: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CatalogClient for ReplayClient {
    async fn fetch_vehicles(
        &self,
        params: &BTreeMap<String, String>,
    ) -> Result<VehiclePage, ClientError> {
        self.seen_params
            .lock()
            .expect("lock poisoned")
            .push(params.clone());
        self.pages.lock().expect("lock poisoned").remove(0)
    }

    async fn fetch_level_options(
        &self,
        _level: HierarchyLevel,
        _parent_ids: Option<&str>,
    ) -> Result<Vec<EntityRef>, ClientError> {
        Ok(vec![EntityRef::new("10", "Corolla")])
    }

    async fn fetch_facet_values(&self, _facet_key: &str) -> Result<Vec<FacetValue>, ClientError> {
        Ok(vec![
            FacetValue::new("3", "Hybrid"),
            FacetValue::new("4", "Petrol"),
        ])
    }
}

fn page(json: serde_json::Value) -> VehiclePage {
    serde_json::from_value(json).expect("page decodes")
}

#[tokio::test]
async fn session_refines_selection_across_fetches() {
    let client = ReplayClient::new(vec![
        Ok(page(serde_json::json!({
            "items": [
                {"id": 1, "brandName": "Toyota", "modelName": "Corolla",
                 "slug": "toyota-corolla-white-body"},
                {"id": 2, "brandName": "Toyota", "modelName": "Camry",
                 "slug": "toyota-camry-red-body"}
            ],
            "currentPage": 1, "totalPages": 1, "totalItems": 2
        }))),
        Ok(page(serde_json::json!({
            "items": [
                {"id": 2, "brandName": "Toyota", "modelName": "Camry",
                 "slug": "toyota-camry-red-body"}
            ],
            "currentPage": 1, "totalPages": 1, "totalItems": 1
        }))),
    ]);

    let mut engine = FilterEngine::new(EngineConfig::default()).expect("valid config");
    engine.select_hierarchy(HierarchyLevel::Brand, EntityRef::new("1", "Toyota"));

    let first = engine.refresh_first_page(&client).await;
    assert_eq!(first, FetchOutcome::Applied { matched: 2, dropped: 0 });

    // Narrowing by a text-only facet filters locally on the next applied
    // page and never appears in the outgoing parameters.
    engine.toggle_facet("color", FacetValue::unbacked("Red"));
    let second = engine.refresh_first_page(&client).await;
    assert_eq!(second, FetchOutcome::Applied { matched: 1, dropped: 0 });
    assert_eq!(engine.vehicles()[0].id, "2");

    let seen = client.seen_params.lock().expect("lock poisoned");
    assert_eq!(seen.len(), 2);
    for params in seen.iter() {
        assert_eq!(params.get("brandId").map(String::as_str), Some("1"));
        assert!(!params.contains_key("color"));
    }
    assert_eq!(seen[0].get("limit").map(String::as_str), Some("20"));
}

#[tokio::test]
async fn failed_fetch_leaves_an_empty_but_usable_engine() {
    let client = ReplayClient::new(vec![
        Err(ClientError::Transport("gateway timeout".into())),
        Ok(page(serde_json::json!({
            "items": [{"id": 7, "brandName": "Honda"}]
        }))),
    ]);

    let mut engine = FilterEngine::new(EngineConfig::default()).expect("valid config");
    let outcome = engine.refresh_first_page(&client).await;
    assert_eq!(outcome, FetchOutcome::Unavailable);
    assert!(engine.vehicles().is_empty());

    // The engine recovers on the next successful fetch.
    let outcome = engine.refresh_first_page(&client).await;
    assert_eq!(outcome, FetchOutcome::Applied { matched: 1, dropped: 0 });
    assert_eq!(engine.vehicles()[0].id, "7");
}

#[test]
fn stale_response_never_overwrites_a_newer_selection() {
    let mut engine = FilterEngine::new(EngineConfig::default()).expect("valid config");
    engine.select_hierarchy(HierarchyLevel::Brand, EntityRef::new("1", "Toyota"));

    let slow_ticket = engine.begin_fetch();
    engine.select_hierarchy(HierarchyLevel::Brand, EntityRef::new("2", "Honda"));
    let fresh_ticket = engine.begin_fetch();

    let fresh = engine.apply_vehicle_response(
        fresh_ticket,
        Ok(page(serde_json::json!({
            "items": [{"id": 2, "brandName": "Honda"}]
        }))),
    );
    assert_eq!(fresh, FetchOutcome::Applied { matched: 1, dropped: 0 });

    // The older fetch finally resolves; it must be ignored.
    let stale = engine.apply_vehicle_response(
        slow_ticket,
        Ok(page(serde_json::json!({
            "items": [{"id": 1, "brandName": "Toyota"}]
        }))),
    );
    assert_eq!(stale, FetchOutcome::Stale);
    assert_eq!(engine.vehicles()[0].id, "2");
}
