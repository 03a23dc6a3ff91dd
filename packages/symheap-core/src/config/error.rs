//! Configuration errors
//!
//! Messages name the offending value and, where one exists, the fix.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration has no 'version' field; start the file with 'version: 1'")]
    MissingVersion,

    #[error("configuration version {found} is not supported (known: {})", join(supported))]
    UnsupportedVersion { found: u32, supported: Vec<u32> },

    #[error("unknown preset '{0}' (expected fast, balanced, thorough or custom)")]
    UnknownPreset(String),

    /// Two settings that cannot take effect together
    #[error("conflicting settings: {issue}; fix: {fix}")]
    Conflict { issue: String, fix: String },

    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

fn join(versions: &[u32]) -> String {
    versions
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ConfigError {
    pub fn conflict(issue: impl Into<String>, fix: impl Into<String>) -> Self {
        Self::Conflict {
            issue: issue.into(),
            fix: fix.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_fix() {
        let err = ConfigError::UnsupportedVersion {
            found: 3,
            supported: vec![1, 2],
        };
        assert_eq!(
            err.to_string(),
            "configuration version 3 is not supported (known: 1, 2)"
        );

        let err = ConfigError::conflict("flat histories have no tree", "use representation: tree");
        assert!(err.to_string().ends_with("fix: use representation: tree"));
        assert!(ConfigError::MissingVersion.to_string().contains("version: 1"));
    }
}
