//! Named starting points for `UpdatesConfig`
//!
//! Every preset builds region trees with concrete overwrite pruning. They
//! differ in how much the engine distrusts itself.

use super::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Exploration runs
    Fast,

    #[default]
    Balanced,

    /// Debugging the engine itself: region-tree invariants are re-checked
    /// after every mutation and a violation panics
    Thorough,

    /// Balanced values, meant to be overridden from YAML
    Custom,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Self::Fast, Self::Balanced, Self::Thorough, Self::Custom];

    /// Case-insensitive lookup by name
    pub fn from_str(name: &str) -> ConfigResult<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Thorough => "thorough",
            Self::Custom => "custom",
        }
    }

    /// Whether tree invariants are verified eagerly under this preset
    pub fn verifies_invariants(&self) -> bool {
        matches!(self, Self::Thorough)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
