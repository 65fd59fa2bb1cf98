use serde::{Deserialize, Serialize};
use vcf_slug::SlugConfig;

use crate::NormalizeError;

/// Runtime configuration for attribute normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Semantic version of the normalization configuration.
    pub version: u32,
    /// Whether to strip ASCII control characters from string attributes.
    pub strip_control_chars: bool,
    /// Slug color extraction settings used for the fallback color sources.
    pub slug: SlugConfig,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            strip_control_chars: true,
            slug: SlugConfig::default(),
        }
    }
}

impl NormalizeConfig {
    /// Validate the configuration before a normalization pass.
    pub fn validate(&self) -> Result<(), NormalizeError> {
        if self.version == 0 {
            return Err(NormalizeError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        self.slug.validate()?;
        Ok(())
    }
}
