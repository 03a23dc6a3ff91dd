//! Update-log configuration
//!
//! Picks the history representation for new collections, the overwrite
//! policy of region trees, and whether tree invariants are re-verified.

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use crate::features::updates::OverwriteMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

const SUPPORTED_VERSIONS: &[u32] = &[1];

/// Shape of a collection's history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    /// Newest-first cons chain, linear read-side pruning
    Flat,
    /// Region-indexed persistent tree
    Tree,
}

impl Default for Representation {
    fn default() -> Self {
        Self::Tree
    }
}

/// Configuration for update histories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatesConfig {
    pub preset: Preset,
    pub representation: Representation,
    pub overwrite: OverwriteMode,
    /// Re-check region-tree invariants after every mutation and panic on violation
    pub verify_invariants: bool,
}

/// YAML schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatesConfigFileV1 {
    /// Schema version (always 1 for v1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    /// Base preset
    pub preset: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub representation: Option<Representation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub overwrite: Option<OverwriteMode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_invariants: Option<bool>,
}

impl UpdatesConfig {
    /// Full defaults for a preset
    pub fn preset(preset: Preset) -> Self {
        Self {
            preset,
            representation: Representation::Tree,
            overwrite: OverwriteMode::Concrete,
            verify_invariants: preset.verifies_invariants(),
        }
    }

    pub fn with_representation(mut self, representation: Representation) -> Self {
        self.representation = representation;
        self
    }

    pub fn with_overwrite(mut self, overwrite: OverwriteMode) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_verification(mut self, verify_invariants: bool) -> Self {
        self.verify_invariants = verify_invariants;
        self
    }

    /// Reject combinations that cannot take effect
    pub fn validate(&self) -> ConfigResult<()> {
        if self.representation == Representation::Flat && self.verify_invariants {
            return Err(ConfigError::conflict(
                "invariant verification requested for flat histories, which have no region tree",
                "set verify_invariants: false or representation: tree",
            ));
        }
        Ok(())
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let file: UpdatesConfigFileV1 = serde_yaml::from_str(yaml)?;
        Self::from_file_schema(file)
    }

    /// Load from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Export as YAML (schema v1)
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let file = UpdatesConfigFileV1 {
            version: Some(1),
            preset: self.preset.as_str().to_string(),
            representation: Some(self.representation),
            overwrite: Some(self.overwrite),
            verify_invariants: Some(self.verify_invariants),
        };
        Ok(serde_yaml::to_string(&file)?)
    }

    fn from_file_schema(file: UpdatesConfigFileV1) -> ConfigResult<Self> {
        let version = file.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let mut config = Self::preset(Preset::from_str(&file.preset)?);
        if let Some(representation) = file.representation {
            config.representation = representation;
        }
        if let Some(overwrite) = file.overwrite {
            config.overwrite = overwrite;
        }
        if let Some(verify) = file.verify_invariants {
            config.verify_invariants = verify;
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for UpdatesConfig {
    fn default() -> Self {
        Self::preset(Preset::default())
    }
}
