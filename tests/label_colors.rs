//! End-to-end tests for label classification and layer preparation

use chartflow::colors::palette::{core, UNKNOWN_COLOR};
use chartflow::colors::KindFamily;
use chartflow::layers::{layer_bounds, prepare_points};
use chartflow::{color_for, try_color_for, ColorScale, ComputeError, ExperimentKind, LayerData};
use pretty_assertions::assert_eq;

fn kinds() -> Vec<ExperimentKind> {
    let mut kinds = ExperimentKind::known().to_vec();
    kinds.push(ExperimentKind::from_name("animals"));
    kinds.push(ExperimentKind::from_name(""));
    kinds
}

fn labels() -> Vec<String> {
    [
        "Mar", "Early In Mar", "Late In Dec", "Winter", "Sun", "Very Early On Mon", "Red",
        "Violet", "Magenta", "C", "C-sharp", "Db", "", "??", "Früh", "Very Late On Someday",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[test]
fn test_month_prefix_is_stripped() {
    let plain = color_for(&ExperimentKind::Month, "Mar", None);
    let early = color_for(&ExperimentKind::Month, "Early In Mar", None);
    let late = color_for(&ExperimentKind::Month, "Late In Mar", None);

    assert_eq!(plain.as_str(), core::BLUE_GREEN);
    assert_eq!(early, plain);
    assert_eq!(late, plain);
}

#[test]
fn test_musical_note_uses_first_character() {
    let kind = ExperimentKind::from_name("musical_note");
    assert_eq!(kind.family(), KindFamily::MusicalNote);
    assert_eq!(color_for(&kind, "C-sharp", None), color_for(&kind, "C", None));
    assert_eq!(color_for(&kind, "C", None).as_str(), core::BLUE);
}

#[test]
fn test_classifier_is_total() {
    let universe = labels();
    for kind in kinds() {
        for label in &universe {
            let color = color_for(&kind, label, Some(&universe));
            assert!(is_hex_color(color.as_str()), "{kind}/{label} -> {color}");

            let without_universe = color_for(&kind, label, None);
            assert!(is_hex_color(without_universe.as_str()));
        }
    }
}

#[test]
fn test_classifier_is_deterministic() {
    let universe = labels();
    for kind in kinds() {
        for label in &universe {
            let first = color_for(&kind, label, Some(&universe));
            // Unrelated calls in between must not change the answer
            let _ = color_for(&kind, "Something else", None);
            let second = color_for(&kind, label, Some(&universe));
            assert_eq!(first, second);
            assert_eq!(color_for(&kind, label, None), color_for(&kind, label, None));
        }
    }
}

#[test]
fn test_fixed_palettes_fall_back_to_neutral() {
    assert_eq!(color_for(&ExperimentKind::Colour, "Teal", None).as_str(), UNKNOWN_COLOR);
    assert_eq!(color_for(&ExperimentKind::Month, "Smarch", None).as_str(), UNKNOWN_COLOR);

    let err = try_color_for(&ExperimentKind::HsvColourOneRed, "Orange", None).unwrap_err();
    assert!(matches!(err, ComputeError::UnknownLabel { .. }));

    // Derived kinds degrade instead of failing
    assert!(try_color_for(&ExperimentKind::WeekdayVery, "Someday", None).is_ok());
}

#[test]
fn test_other_kinds_follow_universe_order() {
    let kind = ExperimentKind::from_name("animals");
    let universe: Vec<String> = ["Cat", "Dog", "Eel"].iter().map(|s| s.to_string()).collect();
    let reversed: Vec<String> = universe.iter().rev().cloned().collect();

    assert_eq!(color_for(&kind, "Cat", Some(&universe)).as_str(), "#1f77b4");
    assert_eq!(color_for(&kind, "Cat", Some(&reversed)).as_str(), "#2ca02c");

    let scale = ColorScale::new(kind.clone(), &universe);
    for label in &universe {
        assert_eq!(scale.color(label), color_for(&kind, label, Some(&universe)));
    }
}

#[test]
fn test_layer_points_end_to_end() {
    let json = r#"{
        "experiment_name": "weekday_very",
        "model_name": "Gemma-2-9B",
        "display_labels": ["Mon", "Very Early On Mon", "Very Late On Sun"],
        "states_pca": [[0.0, 1.0, 0.3], [2.0, -1.0, 0.1], [4.0, 3.0, 0.0]]
    }"#;
    let layer: LayerData = serde_json::from_str(json).unwrap();

    let points = prepare_points(&layer).unwrap();
    let shown: Vec<bool> = points.iter().map(|p| p.show_label).collect();
    assert_eq!(shown, vec![true, false, false]);
    assert_eq!(points[0].color, points[1].color);
    assert_eq!(
        points[2].color,
        color_for(&ExperimentKind::WeekdayVery, "Sun", None)
    );

    let bounds = layer_bounds(&points).unwrap();
    assert!((bounds.x.min - -0.8).abs() < 1e-12);
    assert!((bounds.x.max - 4.8).abs() < 1e-12);
    assert!((bounds.y.min - -1.8).abs() < 1e-12);
    assert!((bounds.y.max - 3.8).abs() < 1e-12);
}
