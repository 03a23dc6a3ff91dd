//! Configuration System
//!
//! Two tiers, same shape as the rest of the workspace:
//! - Level 1: Preset - one-liner
//! - Level 2: YAML - complete control over representation and overwrite policy
//!
//! # Examples
//!
//! ```rust,ignore
//! use symheap_core::config::{Preset, UpdatesConfig};
//!
//! let config = UpdatesConfig::preset(Preset::Thorough);
//! let config = UpdatesConfig::from_yaml("memory.yaml")?;
//! ```

pub mod error;
pub mod preset;
pub mod updates_config;

// Re-exports
pub use error::{ConfigError, ConfigResult};
pub use preset::Preset;
pub use updates_config::{Representation, UpdatesConfig, UpdatesConfigFileV1};
