//! Hidden-state layer views
//!
//! Prepares 2-D projected model states for plotting: pairs each display label
//! with its coordinates, colors it through the classifier, decides which
//! labels are drawn as text and computes padded plot domains.

pub mod points;
pub mod types;

pub use points::{
    layer_bounds, layer_key, layer_numbers, padded_extent, prepare_points, prepare_points_with,
    select_layer, should_show_label, DOMAIN_PADDING,
};
pub use types::{ColoredPoint, Extent, LayerBounds, LayerData, LayerSet, ModelData, ModelName};
