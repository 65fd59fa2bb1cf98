//! YAML configuration file support for VCF.
//!
//! Lets deployments define every stage's configuration (slug extraction,
//! normalization, filter engine) in a single YAML file and load it at
//! runtime.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! # VCF Pipeline Configuration
//! version: "1.0"
//!
//! slug:
//!   version: 1
//!   segment_marker: "inside"
//!
//! normalize:
//!   version: 1
//!   strip_control_chars: true
//!
//! engine:
//!   version: 1
//!   page_limit: 20
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vcf_ingest::NormalizeConfig;
use vcf_match::EngineConfig;
use vcf_slug::SlugConfig;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration structure for the whole pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VcfConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Slug color-extraction configuration
    #[serde(default)]
    pub slug: SlugConfig,

    /// Record normalization configuration
    #[serde(default)]
    pub normalize: NormalizeYamlConfig,

    /// Filter engine configuration
    #[serde(default)]
    pub engine: EngineYamlConfig,
}

impl VcfConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: VcfConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.slug
            .validate()
            .map_err(|err| ConfigLoadError::Validation(err.to_string()))?;
        self.normalize.validate()?;
        self.engine.validate()?;

        Ok(())
    }

    /// Assemble the normalization config from the `slug` and `normalize`
    /// sections.
    pub fn normalize_config(&self) -> NormalizeConfig {
        NormalizeConfig {
            version: self.normalize.version,
            strip_control_chars: self.normalize.strip_control_chars,
            slug: self.slug.clone(),
        }
    }

    /// Assemble the engine config, embedding the normalization settings.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            version: self.engine.version,
            page_limit: self.engine.page_limit,
            normalize: self.normalize_config(),
        }
    }
}

impl Default for VcfConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            slug: SlugConfig::default(),
            normalize: NormalizeYamlConfig::default(),
            engine: EngineYamlConfig::default(),
        }
    }
}

/// Normalization stage YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "true_value")]
    pub strip_control_chars: bool,
}

impl NormalizeYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.version == 0 {
            return Err(ConfigLoadError::Validation(
                "normalize.version must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for NormalizeYamlConfig {
    fn default() -> Self {
        Self {
            version: 1,
            strip_control_chars: true,
        }
    }
}

/// Filter engine YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

impl EngineYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.version == 0 {
            return Err(ConfigLoadError::Validation(
                "engine.version must be >= 1".to_string(),
            ));
        }
        if self.page_limit == 0 {
            return Err(ConfigLoadError::Validation(
                "engine.page_limit must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineYamlConfig {
    fn default() -> Self {
        Self {
            version: 1,
            page_limit: 20,
        }
    }
}

// Helper functions for serde defaults
fn default_version() -> u32 {
    1
}
fn true_value() -> bool {
    true
}
fn default_page_limit() -> u32 {
    20
}
