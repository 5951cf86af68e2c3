//! Point preparation
//!
//! Turns a `LayerData` into colored, label-flagged points and computes the
//! padded data domains the renderer scales against.

use crate::colors::{Classifier, ColorScale, ExperimentKind};
use crate::error::ComputeError;
use crate::layers::types::{ColoredPoint, Extent, LayerBounds, LayerData, LayerSet, ModelData};

/// Fraction of the data range added on each side of a domain
pub const DOMAIN_PADDING: f64 = 0.2;

/// Whether a label should be drawn as text next to its point.
///
/// Qualified month and weekday labels ("Early In Mar", "Very Late On Sun")
/// stay unlabeled so the plain names remain readable.
pub fn should_show_label(kind: &ExperimentKind, label: &str) -> bool {
    match kind.canonical() {
        ExperimentKind::Month => !label.contains("Early In") && !label.contains("Late In"),
        ExperimentKind::WeekdayVery => {
            !label.contains("Very Early On") && !label.contains("Very Late On")
        }
        _ => true,
    }
}

/// Pair labels with coordinates and classify them with the default classifier
pub fn prepare_points(layer: &LayerData) -> Result<Vec<ColoredPoint>, ComputeError> {
    prepare_points_with(Classifier::shared(), layer)
}

/// Pair labels with coordinates and classify them with `classifier`
pub fn prepare_points_with(
    classifier: &Classifier,
    layer: &LayerData,
) -> Result<Vec<ColoredPoint>, ComputeError> {
    if layer.display_labels.len() != layer.states_pca.len() {
        return Err(ComputeError::ParseError(format!(
            "layer has {} labels but {} projected states",
            layer.display_labels.len(),
            layer.states_pca.len()
        )));
    }

    let scale = ColorScale::with_classifier(
        classifier,
        layer.experiment_name.clone(),
        &layer.display_labels,
    );

    layer
        .display_labels
        .iter()
        .zip(&layer.states_pca)
        .enumerate()
        .map(|(i, (label, state))| match state.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => Ok(ColoredPoint {
                label: label.clone(),
                x: *x,
                y: *y,
                color: scale.color(label),
                show_label: should_show_label(&layer.experiment_name, label),
            }),
            [_, _, ..] => Err(ComputeError::ParseError(format!(
                "state {i} ('{label}') has non-finite coordinates"
            ))),
            _ => Err(ComputeError::ParseError(format!(
                "state {i} ('{label}') has fewer than two components"
            ))),
        })
        .collect()
}

/// Widen `[min, max]` of `values` by `padding` times the range on each side.
///
/// Returns `None` for an empty input.
pub fn padded_extent(values: impl IntoIterator<Item = f64>, padding: f64) -> Option<Extent> {
    let (min, max) = values
        .into_iter()
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;

    let pad = (max - min) * padding;
    Some(Extent {
        min: min - pad,
        max: max + pad,
    })
}

/// Padded x and y domains for a set of prepared points
pub fn layer_bounds(points: &[ColoredPoint]) -> Option<LayerBounds> {
    Some(LayerBounds {
        x: padded_extent(points.iter().map(|p| p.x), DOMAIN_PADDING)?,
        y: padded_extent(points.iter().map(|p| p.y), DOMAIN_PADDING)?,
    })
}

/// Key under which layer `n` is stored
pub fn layer_key(layer: u32) -> String {
    format!("layer_{layer}")
}

/// Layer numbers present in a set, ascending
pub fn layer_numbers(layers: &LayerSet) -> Vec<u32> {
    let mut numbers: Vec<u32> = layers
        .keys()
        .filter_map(|k| k.strip_prefix("layer_")?.parse().ok())
        .collect();
    numbers.sort_unstable();
    numbers
}

/// Look up one model's layer
pub fn select_layer<'a>(data: &'a ModelData, model: &str, layer: u32) -> Option<&'a LayerData> {
    data.get(model)?.get(&layer_key(layer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::palette::core;
    use std::collections::BTreeMap;

    fn layer(kind: ExperimentKind, labels: &[&str], states: Vec<Vec<f64>>) -> LayerData {
        LayerData {
            experiment_name: kind,
            model_name: "Gemma-2-2B".to_string(),
            display_labels: labels.iter().map(|s| s.to_string()).collect(),
            states_pca: states,
            base_items: None,
            string_modifiers: None,
        }
    }

    #[test]
    fn test_should_show_label() {
        assert!(should_show_label(&ExperimentKind::Month, "Mar"));
        assert!(!should_show_label(&ExperimentKind::Month, "Early In Mar"));
        assert!(!should_show_label(&ExperimentKind::Month, "Late In Mar"));
        assert!(!should_show_label(&ExperimentKind::WeekdayVery, "Very Late On Fri"));
        assert!(should_show_label(&ExperimentKind::WeekdayVery, "Fri"));
        assert!(should_show_label(&ExperimentKind::Colour, "Early In Red"));
        assert!(!should_show_label(
            &ExperimentKind::Other("month".to_string()),
            "Early In Mar"
        ));
    }

    #[test]
    fn test_prepare_points() {
        let data = layer(
            ExperimentKind::Month,
            &["Mar", "Early In Mar"],
            vec![vec![1.0, 2.0, 9.0], vec![-1.0, 0.5]],
        );

        let points = prepare_points(&data).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].x, 1.0);
        assert_eq!(points[0].y, 2.0);
        assert!(points[0].show_label);
        assert!(!points[1].show_label);
        assert_eq!(points[0].color.as_str(), core::BLUE_GREEN);
        assert_eq!(points[1].color, points[0].color);
    }

    #[test]
    fn test_prepare_points_musical_notes_use_family_rule() {
        let data = layer(
            ExperimentKind::MusicalNoteFlatSharp,
            &["C#", "Db"],
            vec![vec![0.0, 0.0], vec![1.0, 1.0]],
        );
        let points = prepare_points(&data).unwrap();
        assert_eq!(points[0].color.as_str(), core::BLUE);
        assert_eq!(points[1].color.as_str(), core::GREEN);
    }

    #[test]
    fn test_prepare_points_rejects_mismatched_rows() {
        let data = layer(ExperimentKind::Colour, &["Red", "Blue"], vec![vec![0.0, 0.0]]);
        assert!(prepare_points(&data).is_err());

        let data = layer(ExperimentKind::Colour, &["Red"], vec![vec![0.0]]);
        assert!(prepare_points(&data).is_err());

        let data = layer(ExperimentKind::Colour, &["Red"], vec![vec![f64::NAN, 0.0]]);
        assert!(prepare_points(&data).is_err());
    }

    #[test]
    fn test_padded_extent() {
        let extent = padded_extent(vec![0.0, 10.0, 5.0], 0.2).unwrap();
        assert_eq!(extent.min, -2.0);
        assert_eq!(extent.max, 12.0);

        assert!(padded_extent(Vec::<f64>::new(), 0.2).is_none());

        let single = padded_extent(vec![3.0], 0.2).unwrap();
        assert_eq!(single.min, 3.0);
        assert_eq!(single.max, 3.0);
    }

    #[test]
    fn test_layer_bounds() {
        let data = layer(
            ExperimentKind::Colour,
            &["Red", "Blue"],
            vec![vec![0.0, -5.0], vec![10.0, 5.0]],
        );
        let points = prepare_points(&data).unwrap();
        let bounds = layer_bounds(&points).unwrap();

        assert_eq!(bounds.x.min, -2.0);
        assert_eq!(bounds.y.max, 7.0);
        assert!(layer_bounds(&[]).is_none());
    }

    #[test]
    fn test_layer_lookup() {
        let mut layers = BTreeMap::new();
        layers.insert(
            layer_key(10),
            layer(ExperimentKind::Colour, &["Red"], vec![vec![0.0, 0.0]]),
        );
        layers.insert(
            layer_key(2),
            layer(ExperimentKind::Colour, &["Blue"], vec![vec![0.0, 0.0]]),
        );
        layers.insert("summary".to_string(), layer(ExperimentKind::Colour, &[], vec![]));

        assert_eq!(layer_numbers(&layers), vec![2, 10]);

        let mut data = BTreeMap::new();
        data.insert("Gemma-2-2B".to_string(), layers);
        assert_eq!(
            select_layer(&data, "Gemma-2-2B", 2).map(|l| l.display_labels[0].as_str()),
            Some("Blue")
        );
        assert!(select_layer(&data, "Gemma-2-9B", 2).is_none());
    }
}
