//! Default vocabulary and marker words for slug color extraction.
//!
//! The vocabulary is a closed set: extraction only ever reports terms listed
//! here (or in a caller-supplied override), so downstream facet matching can
//! rely on a bounded value space.

use once_cell::sync::Lazy;

/// Word that splits a slug into an exterior and an interior segment.
pub const SEGMENT_MARKER: &str = "inside";

static COLOR_TERMS: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "white", "black", "red", "blue", "silver", "beige", "gray", "grey", "green", "brown",
        "yellow", "orange", "gold", "purple", "maroon",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
});

static EXTERIOR_MARKERS: Lazy<Vec<String>> = Lazy::new(|| {
    ["body", "roof", "pearl", "metallic"]
        .into_iter()
        .map(str::to_string)
        .collect()
});

static INTERIOR_MARKERS: Lazy<Vec<String>> = Lazy::new(|| {
    ["inside", "interior"]
        .into_iter()
        .map(str::to_string)
        .collect()
});

pub fn default_vocabulary() -> Vec<String> {
    COLOR_TERMS.clone()
}

pub fn default_exterior_markers() -> Vec<String> {
    EXTERIOR_MARKERS.clone()
}

pub fn default_interior_markers() -> Vec<String> {
    INTERIOR_MARKERS.clone()
}
