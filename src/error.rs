use thiserror::Error;

/// Result type for qmarl operations
pub type Result<T> = std::result::Result<T, MarlError>;

/// Main error type for the qmarl library
#[derive(Debug, Error)]
pub enum MarlError {
    /// Invalid dimensions for operations
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Sampling more transitions than the buffer holds
    #[error("Insufficient samples: requested {requested}, buffer holds {available}")]
    InsufficientSamples {
        requested: usize,
        available: usize,
    },

    /// IO errors (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parse errors
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

// Helper functions for common error patterns
impl MarlError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        MarlError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        MarlError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
