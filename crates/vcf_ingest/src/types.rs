//! Raw record shapes as the inventory API actually delivers them.
//!
//! The remote API is loosely typed: hierarchy attributes arrive either as
//! flat strings or as nested `{id, name}` entities, identifiers arrive as
//! strings or numbers, and the specification-value list mixes property
//! casings and nesting depth across endpoint versions. Everything here is
//! deliberately permissive; `normalize` is the single adapter that turns
//! these shapes into one canonical view.

use serde::{Deserialize, Serialize};

/// An identifier or scalar that may arrive as a JSON string or number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawScalar {
    Number(i64),
    Text(String),
}

impl RawScalar {
    /// Render the scalar as a trimmed string; `None` when blank.
    pub fn as_trimmed_string(&self) -> Option<String> {
        match self {
            RawScalar::Number(n) => Some(n.to_string()),
            RawScalar::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }
}

/// A nested `{id, name}` entity as returned by lookup endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawEntity {
    #[serde(default, alias = "Id", alias = "_id")]
    pub id: Option<RawScalar>,
    #[serde(default, alias = "Name")]
    pub name: Option<String>,
}

/// A hierarchy attribute that is either a flat string or a nested entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawEntityField {
    Name(String),
    Entity(RawEntity),
}

impl RawEntityField {
    /// The flat-string form of the field, when present.
    pub fn flat_name(&self) -> Option<&str> {
        match self {
            RawEntityField::Name(name) => Some(name),
            RawEntityField::Entity(_) => None,
        }
    }

    /// The nested entity's name, when present.
    pub fn nested_name(&self) -> Option<&str> {
        match self {
            RawEntityField::Name(_) => None,
            RawEntityField::Entity(entity) => entity.name.as_deref(),
        }
    }
}

/// A year attribute that is either a flat scalar or a nested entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawYearField {
    Value(RawScalar),
    Entity(RawEntity),
}

impl RawYearField {
    /// Render the year as a trimmed string; `None` when blank.
    pub fn as_trimmed_string(&self) -> Option<String> {
        match self {
            RawYearField::Value(scalar) => scalar.as_trimmed_string(),
            RawYearField::Entity(entity) => entity
                .name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        }
    }
}

/// One entry of the specification-value list.
///
/// Both `{key, value}` and `{specification: {key}, value}` shapes occur, in
/// both lower and upper property casing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawSpecificationValue {
    #[serde(
        default,
        alias = "Key",
        alias = "specKey",
        alias = "facetKey",
        alias = "specificationKey"
    )]
    pub key: Option<String>,
    #[serde(default, alias = "Value", alias = "valueName")]
    pub value: Option<String>,
    #[serde(default, alias = "Specification")]
    pub specification: Option<RawSpecificationKey>,
}

impl RawSpecificationValue {
    /// The facet key, preferring the flat property over the nested one.
    pub fn facet_key(&self) -> Option<&str> {
        self.key
            .as_deref()
            .or_else(|| self.specification.as_ref().and_then(|s| s.key.as_deref()))
    }
}

/// Nested specification descriptor carrying only the facet key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawSpecificationKey {
    #[serde(default, alias = "Key", alias = "name", alias = "Name")]
    pub key: Option<String>,
}

/// The inbound vehicle record, as close to the wire shape as practical.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawVehicleRecord {
    /// Identifier; records without one are rejected during normalization.
    #[serde(default, alias = "_id", alias = "vehicleId")]
    pub id: Option<RawScalar>,
    /// Flat brand name, preferred over the nested entity.
    #[serde(default, alias = "brandName")]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub brand: Option<RawEntityField>,
    #[serde(default, alias = "modelName")]
    pub model_name: Option<String>,
    #[serde(default)]
    pub model: Option<RawEntityField>,
    #[serde(default, alias = "trimName")]
    pub trim_name: Option<String>,
    #[serde(default)]
    pub trim: Option<RawEntityField>,
    /// Year, numeric, string, or nested entity.
    #[serde(default)]
    pub year: Option<RawYearField>,
    /// Alternate year property, used when `year` is absent.
    #[serde(default, alias = "modelYear")]
    pub model_year: Option<RawYearField>,
    /// Flat exterior color convenience field.
    #[serde(default)]
    pub color: Option<String>,
    /// Free-text slug; fallback color source.
    #[serde(default)]
    pub slug: Option<String>,
    /// Free-text extra description; last-resort color source.
    #[serde(default, alias = "additionalInfo")]
    pub additional_info: Option<String>,
    #[serde(default, alias = "specificationValues", alias = "specification_values")]
    pub specification_values: Vec<RawSpecificationValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_decodes_with_nested_and_flat_hierarchy() {
        let json = r#"{
            "id": 42,
            "brandName": "Toyota",
            "model": {"id": "7", "name": "Corolla"},
            "year": 2024
        }"#;
        let record: RawVehicleRecord = serde_json::from_str(json).expect("record decodes");
        assert_eq!(record.id.as_ref().unwrap().as_trimmed_string().unwrap(), "42");
        assert_eq!(record.brand_name.as_deref(), Some("Toyota"));
        assert_eq!(
            record.model.as_ref().unwrap().nested_name(),
            Some("Corolla")
        );
        assert_eq!(record.year.unwrap().as_trimmed_string().unwrap(), "2024");
    }

    #[test]
    fn specification_value_accepts_both_casings_and_nesting() {
        let flat: RawSpecificationValue =
            serde_json::from_str(r#"{"Key": "Fuel_Type", "Value": "Hybrid"}"#).expect("decodes");
        assert_eq!(flat.facet_key(), Some("Fuel_Type"));
        assert_eq!(flat.value.as_deref(), Some("Hybrid"));

        let nested: RawSpecificationValue =
            serde_json::from_str(r#"{"specification": {"key": "transmission"}, "value": "CVT"}"#)
                .expect("decodes");
        assert_eq!(nested.facet_key(), Some("transmission"));
    }

    #[test]
    fn blank_string_id_is_treated_as_absent() {
        let scalar = RawScalar::Text("   ".into());
        assert!(scalar.as_trimmed_string().is_none());
    }
}
