//! Layer data shapes
//!
//! One `LayerData` is a 2-D projection of a model's hidden states at a single
//! layer for one experiment: ordered labels plus one coordinate pair each.

use crate::colors::{Color, ExperimentKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

/// Models with published layer projections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelName {
    #[serde(rename = "Gemma-2-2B")]
    Gemma2_2B,
    #[serde(rename = "Gemma-2-9B")]
    Gemma2_9B,
    #[serde(rename = "Gemma-2-27B")]
    Gemma2_27B,
}

impl ModelName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelName::Gemma2_2B => "Gemma-2-2B",
            ModelName::Gemma2_9B => "Gemma-2-9B",
            ModelName::Gemma2_27B => "Gemma-2-27B",
        }
    }

    /// Highest layer index a reader can step to
    pub fn max_layer(&self) -> u32 {
        match self {
            ModelName::Gemma2_2B => 26,
            ModelName::Gemma2_9B => 42,
            ModelName::Gemma2_27B => 46,
        }
    }

    /// Layers a reader can step through; numbering starts at 1
    pub fn layers(&self) -> RangeInclusive<u32> {
        1..=self.max_layer()
    }

    pub fn has_layer(&self, layer: u32) -> bool {
        self.layers().contains(&layer)
    }

    pub fn all() -> [ModelName; 3] {
        [ModelName::Gemma2_2B, ModelName::Gemma2_9B, ModelName::Gemma2_27B]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|m| m.as_str() == name)
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Projected states for one experiment at one layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerData {
    pub experiment_name: ExperimentKind,
    /// Model tag as written by the exporter; not every export uses a known model
    pub model_name: String,
    pub display_labels: Vec<String>,
    /// One row per label; the first two components are plotted
    pub states_pca: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_items: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_modifiers: Option<Vec<String>>,
}

/// Layers keyed by `layer_<n>`
pub type LayerSet = BTreeMap<String, LayerData>;

/// Layer sets keyed by model name
pub type ModelData = BTreeMap<String, LayerSet>;

/// A label ready for plotting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColoredPoint {
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub color: Color,
    pub show_label: bool,
}

/// Inclusive data range on one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

/// Padded x/y domains for a layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerBounds {
    pub x: Extent,
    pub y: Extent,
}
