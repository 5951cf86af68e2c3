//! Label classification
//!
//! Maps an (experiment kind, label) pair to a color. Every call is a pure
//! function of its arguments and the classifier's immutable configuration.

use crate::colors::kind::{ExperimentKind, KindFamily};
use crate::colors::palette::{self, Palette};
use crate::config::ClassifierConfig;
use crate::error::ComputeError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;
use tracing::warn;

/// An opaque color string, hex (`#RRGGBB`) or a CSS color name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(Cow<'static, str>);

impl Color {
    pub const fn from_static(value: &'static str) -> Self {
        Color(Cow::Borrowed(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `#` followed by 3, 4, 6 or 8 hex digits, or a purely alphabetic name
    pub fn is_valid(&self) -> bool {
        let value = self.as_str();
        match value.strip_prefix('#') {
            Some(hex) => {
                matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
            }
            None => !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic()),
        }
    }
}

impl From<String> for Color {
    fn from(value: String) -> Self {
        Color(Cow::Owned(value))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier with a configurable neutral color and fallback palette
#[derive(Debug, Clone, PartialEq)]
pub struct Classifier {
    unknown_color: Color,
    fallback_palette: Vec<Color>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            unknown_color: Color::from_static(palette::UNKNOWN_COLOR),
            fallback_palette: palette::CATEGORY10
                .iter()
                .copied()
                .map(Color::from_static)
                .collect(),
        }
    }
}

impl Classifier {
    /// Process-wide classifier with the built-in defaults
    pub fn shared() -> &'static Classifier {
        static SHARED: OnceLock<Classifier> = OnceLock::new();
        SHARED.get_or_init(Classifier::default)
    }

    /// Build a classifier from configuration, rejecting invalid colors
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ComputeError> {
        let unknown_color = Color::from(config.unknown_color.clone());
        if !unknown_color.is_valid() {
            return Err(ComputeError::ConfigError(format!(
                "unknown_color '{unknown_color}' is not a valid color"
            )));
        }

        if config.fallback_palette.is_empty() {
            return Err(ComputeError::ConfigError(
                "fallback_palette must contain at least one color".to_string(),
            ));
        }
        let fallback_palette: Vec<Color> = config
            .fallback_palette
            .iter()
            .cloned()
            .map(Color::from)
            .collect();
        if let Some(bad) = fallback_palette.iter().find(|c| !c.is_valid()) {
            return Err(ComputeError::ConfigError(format!(
                "fallback_palette entry '{bad}' is not a valid color"
            )));
        }

        Ok(Self {
            unknown_color,
            fallback_palette,
        })
    }

    pub fn unknown_color(&self) -> &Color {
        &self.unknown_color
    }

    /// Classify a label, failing when a fixed-palette kind does not know it.
    ///
    /// Month and weekday labels never fail: an unrecognized base maps to the
    /// neutral color. `universe` only matters for `ExperimentKind::Other`.
    pub fn try_color_for(
        &self,
        kind: &ExperimentKind,
        label: &str,
        universe: Option<&[String]>,
    ) -> Result<Color, ComputeError> {
        let canonical = kind.canonical();
        let kind = &canonical;
        let unknown = || ComputeError::UnknownLabel {
            kind: kind.as_str().to_string(),
            label: label.to_string(),
        };

        match kind.family() {
            KindFamily::Colour => fixed_palette(kind)
                .and_then(|table| palette::lookup(table, label))
                .map(Color::from_static)
                .ok_or_else(unknown),
            KindFamily::MusicalNote => {
                let mut buf = [0u8; 4];
                let note = match label.chars().next() {
                    Some(c) => &*c.encode_utf8(&mut buf),
                    None => return Err(unknown()),
                };
                palette::lookup(palette::MUSICAL_NOTES, note)
                    .map(Color::from_static)
                    .ok_or_else(unknown)
            }
            KindFamily::Plain => Ok(match kind {
                ExperimentKind::Month => {
                    self.derived(label, palette::MONTH_PREFIXES, palette::MONTHS)
                }
                ExperimentKind::WeekdayVery => {
                    self.derived(label, palette::WEEKDAY_PREFIXES, palette::WEEKDAYS)
                }
                _ => self.categorical(label, universe),
            }),
        }
    }

    /// Classify a label; never fails.
    ///
    /// Labels unknown to a fixed palette get the neutral color.
    pub fn color_for(
        &self,
        kind: &ExperimentKind,
        label: &str,
        universe: Option<&[String]>,
    ) -> Color {
        match self.try_color_for(kind, label, universe) {
            Ok(color) => color,
            Err(e) => {
                warn!(%kind, label, "{e}; using neutral color");
                self.unknown_color.clone()
            }
        }
    }

    fn derived(&self, label: &str, prefixes: &[&str], table: Palette) -> Color {
        let base = palette::strip_first_prefix(label, prefixes);
        palette::lookup(table, &base)
            .map(Color::from_static)
            .unwrap_or_else(|| self.unknown_color.clone())
    }

    fn categorical(&self, label: &str, universe: Option<&[String]>) -> Color {
        let slot = universe
            .and_then(|labels| labels.iter().position(|l| l == label))
            .unwrap_or_else(|| fnv1a(label) as usize);
        self.fallback_palette[slot % self.fallback_palette.len()].clone()
    }
}

fn fixed_palette(kind: &ExperimentKind) -> Option<Palette> {
    match kind {
        ExperimentKind::Colour => Some(palette::RGB_COLOURS),
        ExperimentKind::HsvColourOneRed => Some(palette::HSV_COLOURS),
        _ => None,
    }
}

/// 32-bit FNV-1a; stable across runs and platforms
fn fnv1a(label: &str) -> u32 {
    label.bytes().fold(0x811c_9dc5_u32, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
    })
}

/// Classify a label with the default classifier.
///
/// # Example
/// ```ignore
/// let color = color_for(&ExperimentKind::Month, "Early In Mar", None);
/// assert_eq!(color.as_str(), "#00FF77");
/// ```
pub fn color_for(kind: &ExperimentKind, label: &str, universe: Option<&[String]>) -> Color {
    Classifier::shared().color_for(kind, label, universe)
}

/// Classify a label with the default classifier, surfacing unknown labels
pub fn try_color_for(
    kind: &ExperimentKind,
    label: &str,
    universe: Option<&[String]>,
) -> Result<Color, ComputeError> {
    Classifier::shared().try_color_for(kind, label, universe)
}

/// Precomputed colors for one layer's labels
///
/// Lookups for labels outside the layer fall through to the classifier, so
/// `scale.color(l)` always equals `classifier.color_for(kind, l, Some(labels))`.
#[derive(Debug, Clone)]
pub struct ColorScale<'a> {
    classifier: &'a Classifier,
    kind: ExperimentKind,
    labels: Vec<String>,
    cache: HashMap<String, Color>,
}

impl ColorScale<'static> {
    /// Scale backed by the default classifier
    pub fn new(kind: ExperimentKind, labels: &[String]) -> Self {
        ColorScale::with_classifier(Classifier::shared(), kind, labels)
    }
}

impl<'a> ColorScale<'a> {
    pub fn with_classifier(classifier: &'a Classifier, kind: ExperimentKind, labels: &[String]) -> Self {
        let cache = labels
            .iter()
            .map(|label| {
                let color = classifier.color_for(&kind, label, Some(labels));
                (label.clone(), color)
            })
            .collect();

        Self {
            classifier,
            kind,
            labels: labels.to_vec(),
            cache,
        }
    }

    pub fn kind(&self) -> &ExperimentKind {
        &self.kind
    }

    pub fn color(&self, label: &str) -> Color {
        match self.cache.get(label) {
            Some(color) => color.clone(),
            None => self
                .classifier
                .color_for(&self.kind, label, Some(&self.labels)),
        }
    }
}
