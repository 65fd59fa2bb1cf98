use serde::{Deserialize, Serialize};

use crate::SlugError;
use crate::vocab;

/// Configuration for slug color extraction.
///
/// `version` is a monotonically increasing schema version for the extraction
/// layer. Any change to the vocabulary defaults or the adjacency heuristics
/// that can alter extracted colors must be accompanied by a new version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SlugConfig {
    /// Semantic version of the extraction configuration.
    pub version: u32,
    /// Closed color vocabulary, matched as whole lower-cased words.
    pub vocabulary: Vec<String>,
    /// Words whose adjacency marks a color as an exterior color.
    pub exterior_markers: Vec<String>,
    /// Words whose adjacency disqualifies a color from the exterior list.
    pub interior_markers: Vec<String>,
    /// Word that splits the slug into an exterior and an interior segment.
    pub segment_marker: String,
}

impl Default for SlugConfig {
    fn default() -> Self {
        Self {
            version: 1,
            vocabulary: vocab::default_vocabulary(),
            exterior_markers: vocab::default_exterior_markers(),
            interior_markers: vocab::default_interior_markers(),
            segment_marker: vocab::SEGMENT_MARKER.to_string(),
        }
    }
}

impl SlugConfig {
    /// Validate the configuration before extraction.
    pub fn validate(&self) -> Result<(), SlugError> {
        if self.version == 0 {
            return Err(SlugError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        if self.vocabulary.is_empty() {
            return Err(SlugError::InvalidConfig(
                "color vocabulary must not be empty".into(),
            ));
        }
        if self.segment_marker.trim().is_empty() {
            return Err(SlugError::InvalidConfig(
                "segment_marker must not be empty".into(),
            ));
        }
        Ok(())
    }
}
