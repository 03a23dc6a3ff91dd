//! Error types for symheap-core
//!
//! Structural operations on histories are total. The variants here surface
//! from invariant checks and configuration, and an invariant violation is
//! never something a caller should retry.

use thiserror::Error;

/// Main error type for symheap-core operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SymheapError {
    /// A persistent structure was found in a state its constructors never produce
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// A region implementation was asked for something it cannot represent
    #[error("Unsupported region operation: {0}")]
    UnsupportedRegionOperation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SymheapError {
    /// Create an invariant violation error
    pub fn invariant(msg: impl Into<String>) -> Self {
        SymheapError::InvariantViolation(msg.into())
    }

    /// Create an unsupported region operation error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        SymheapError::UnsupportedRegionOperation(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        SymheapError::Config(msg.into())
    }
}

impl From<crate::config::ConfigError> for SymheapError {
    fn from(err: crate::config::ConfigError) -> Self {
        SymheapError::Config(err.to_string())
    }
}

/// Result type alias for symheap operations
pub type Result<T> = std::result::Result<T, SymheapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SymheapError::invariant("child region escapes parent");
        assert_eq!(
            err.to_string(),
            "Invariant violation: child region escapes parent"
        );

        let err = SymheapError::unsupported("cofinite subtraction");
        assert!(err.to_string().contains("cofinite subtraction"));
    }
}
