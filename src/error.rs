//! Error types for Chartflow

use std::fmt;
use thiserror::Error;

/// Why a single input record could not be aggregated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordDefect {
    /// A required code or name field is absent or blank
    MissingField(&'static str),
    /// A numeric field is NaN or infinite
    NonFiniteNumber(&'static str),
    /// The year is finite but not a whole number in range
    NonIntegralYear,
}

impl fmt::Display for RecordDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordDefect::MissingField(field) => write!(f, "missing required field '{field}'"),
            RecordDefect::NonFiniteNumber(field) => write!(f, "field '{field}' is not a finite number"),
            RecordDefect::NonIntegralYear => write!(f, "field 'year' is not a whole number"),
        }
    }
}

/// Errors that can occur during aggregation or classification
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Malformed record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: RecordDefect },

    #[error(
        "Duplicate title {title} in {category}/{main_group}/{title_group} for year {year}"
    )]
    DuplicateTitle {
        year: i32,
        category: String,
        main_group: String,
        title_group: String,
        title: String,
    },

    #[error("Label '{label}' is not in the {kind} palette")]
    UnknownLabel { kind: String, label: String },

    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

impl From<toml::de::Error> for ComputeError {
    fn from(e: toml::de::Error) -> Self {
        ComputeError::ConfigError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_record_message() {
        let err = ComputeError::MalformedRecord {
            index: 3,
            reason: RecordDefect::MissingField("titleCode"),
        };
        assert_eq!(
            err.to_string(),
            "Malformed record at index 3: missing required field 'titleCode'"
        );
    }

    #[test]
    fn test_encoding_error_message() {
        let err = ComputeError::EncodingError("key must be a string".to_string());
        assert_eq!(err.to_string(), "Encoding error: key must be a string");
    }

    #[test]
    fn test_toml_error_becomes_config_error() {
        let parsed: Result<toml::Value, _> = toml::from_str("[aggregation\nmalformed = ");
        let err: ComputeError = parsed.unwrap_err().into();
        assert!(matches!(err, ComputeError::ConfigError(_)));
    }
}
