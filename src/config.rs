//! Configuration file handling
//!
//! Settings are read from a `chartflow.toml` file. Every field has a default,
//! so an empty file (or no file) yields the built-in behavior.

use crate::aggregator::{AggregationOptions, DuplicatePolicy, MalformedPolicy};
use crate::colors::palette::{CATEGORY10, UNKNOWN_COLOR};
use crate::error::ComputeError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "chartflow.toml";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Aggregation settings.
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Classifier settings.
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// Aggregation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// `reject` fails the batch on a malformed record, `skip` drops it.
    #[serde(default)]
    pub malformed: MalformedPolicy,

    /// `overwrite` keeps the last duplicate title, `reject` fails.
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
}

impl AggregationConfig {
    pub fn options(&self) -> AggregationOptions {
        AggregationOptions {
            malformed: self.malformed,
            duplicates: self.duplicates,
        }
    }
}

/// Classifier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Color for labels a palette cannot place.
    #[serde(default = "default_unknown_color")]
    pub unknown_color: String,

    /// Cyclic palette for experiment kinds without a dedicated table.
    #[serde(default = "default_fallback_palette")]
    pub fallback_palette: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            unknown_color: default_unknown_color(),
            fallback_palette: default_fallback_palette(),
        }
    }
}

fn default_unknown_color() -> String {
    UNKNOWN_COLOR.to_string()
}

fn default_fallback_palette() -> Vec<String> {
    CATEGORY10.iter().map(|c| c.to_string()).collect()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ComputeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ComputeError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ComputeError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>, ComputeError> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
