use std::error::Error;

use vcf::{
    EntityRef, FacetSelection, FacetValue, HierarchyLevel, HierarchySelection, NormalizeConfig,
    compile, normalize_and_filter,
};

const SAMPLE_RECORDS: &str = r#"[
    {"id": 1, "brandName": "Toyota", "modelName": "Corolla", "year": 2023,
     "slug": "toyota-corolla-white-body-inside-black",
     "specificationValues": [{"key": "fuel_type", "value": "Hybrid"}]},
    {"id": 2, "brandName": "Toyota", "modelName": "Camry", "year": 2022,
     "slug": "toyota-camry-silver-body",
     "specificationValues": [{"key": "fuel_type", "value": "Petrol"}]},
    {"id": 3, "brandName": "Honda", "modelName": "Civic", "year": 2023,
     "slug": "honda-civic-red-body-inside-beige",
     "specificationValues": [{"key": "fuel_type", "value": "Hybrid"}]},
    {"brandName": "Mazda", "modelName": "malformed, no identifier"}
]"#;

fn main() -> Result<(), Box<dyn Error>> {
    let records = vcf::decode_records(SAMPLE_RECORDS)?;

    let mut hierarchy = HierarchySelection::default();
    hierarchy.select(HierarchyLevel::Brand, EntityRef::new("1", "Toyota"));

    let mut facets = FacetSelection::default();
    facets.toggle("fuel_type", FacetValue::new("3", "Hybrid"));

    let filter = compile(&hierarchy, &facets);
    println!("Remote projection: {:?}", filter.remote_params());

    let (views, stats) =
        normalize_and_filter(records, &hierarchy, &facets, &NormalizeConfig::default())?;

    println!(
        "Normalized {} of {} records ({} rejected), {} matched the selection:",
        stats.normalized, stats.total, stats.rejected_missing_id, views.len()
    );
    for view in &views {
        println!(
            "  #{} {} {} colors={:?}",
            view.id,
            view.hierarchy.brand.as_deref().unwrap_or("-"),
            view.hierarchy.model.as_deref().unwrap_or("-"),
            view.facet_values("color")
        );
    }

    Ok(())
}
