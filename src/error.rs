//! Error types for loading, configuration and persistence

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum GroupError {
    /// A file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader failed below the record level.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A configuration file is not valid JSON for `Config`.
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl GroupError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Why a single input record was skipped
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(f64),

    #[error("unknown event kind: {0:?}")]
    UnknownKind(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_error_messages() {
        let err = RecordError::FieldCount { expected: 3, found: 2 };
        assert_eq!(err.to_string(), "expected 3 fields, found 2");

        let err = RecordError::InvalidNumber {
            field: "nodeA",
            value: "x1".to_string(),
        };
        assert_eq!(err.to_string(), "invalid nodeA: \"x1\"");
    }

    #[test]
    fn test_invalid_config_message() {
        let err = GroupError::invalid_config("gamma must be within [0, 1]");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: gamma must be within [0, 1]"
        );
    }
}
