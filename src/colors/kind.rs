//! Experiment kinds
//!
//! A kind names the classification scheme for a layer's labels. The set is
//! closed; anything else parses to `ExperimentKind::Other` and gets the
//! categorical fallback palette.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification scheme for a set of labels
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentKind {
    /// Month names with optional "Early In "/"Late In " qualifiers
    Month,
    /// Weekday names with optional "Very Early On "/"Very Late On " qualifiers
    WeekdayVery,
    /// Eight RGB colour names
    Colour,
    /// Six HSV colour names
    HsvColourOneRed,
    /// Note letters
    MusicalNote,
    /// Note letters with flat/sharp accidentals
    MusicalNoteFlatSharp,
    /// Any other experiment tag.
    ///
    /// Serializes as the bare tag, so `Other("month")` reads back as `Month`;
    /// classification goes through `canonical()` and treats the two alike.
    #[serde(untagged)]
    Other(String),
}

/// How a label is reduced before palette lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindFamily {
    /// Full label lookup in a fixed colour table
    Colour,
    /// Lookup by the label's first character
    MusicalNote,
    /// Kind-specific derivation (prefix stripping) or fallback palette
    Plain,
}

impl ExperimentKind {
    /// Parse an experiment tag
    pub fn from_name(name: &str) -> Self {
        match name {
            "month" => ExperimentKind::Month,
            "weekday_very" => ExperimentKind::WeekdayVery,
            "colour" => ExperimentKind::Colour,
            "hsv_colour_one_red" => ExperimentKind::HsvColourOneRed,
            "musical_note" => ExperimentKind::MusicalNote,
            "musical_note_flat_sharp" => ExperimentKind::MusicalNoteFlatSharp,
            other => ExperimentKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ExperimentKind::Month => "month",
            ExperimentKind::WeekdayVery => "weekday_very",
            ExperimentKind::Colour => "colour",
            ExperimentKind::HsvColourOneRed => "hsv_colour_one_red",
            ExperimentKind::MusicalNote => "musical_note",
            ExperimentKind::MusicalNoteFlatSharp => "musical_note_flat_sharp",
            ExperimentKind::Other(name) => name.as_str(),
        }
    }

    /// The variant this kind's tag parses to; `Other` holding a known tag
    /// becomes that tag's variant
    pub fn canonical(&self) -> ExperimentKind {
        match self {
            ExperimentKind::Other(name) => ExperimentKind::from_name(name),
            known => known.clone(),
        }
    }

    pub fn family(&self) -> KindFamily {
        match self.canonical() {
            ExperimentKind::Colour | ExperimentKind::HsvColourOneRed => KindFamily::Colour,
            ExperimentKind::MusicalNote | ExperimentKind::MusicalNoteFlatSharp => {
                KindFamily::MusicalNote
            }
            ExperimentKind::Month | ExperimentKind::WeekdayVery | ExperimentKind::Other(_) => {
                KindFamily::Plain
            }
        }
    }

    /// Reader-facing name; unknown tags are title-cased word by word
    pub fn display_name(&self) -> String {
        match self.canonical() {
            ExperimentKind::Month => "Months".to_string(),
            ExperimentKind::WeekdayVery => "Weekdays".to_string(),
            ExperimentKind::HsvColourOneRed => "HSV Colours".to_string(),
            ExperimentKind::Colour => "RGB Colours".to_string(),
            ExperimentKind::MusicalNote => "Musical Notes".to_string(),
            ExperimentKind::MusicalNoteFlatSharp => "Musical Notes (Flat/Sharp)".to_string(),
            ExperimentKind::Other(ref name) => name
                .split('_')
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// The six kinds with a dedicated scheme
    pub fn known() -> [ExperimentKind; 6] {
        [
            ExperimentKind::Month,
            ExperimentKind::WeekdayVery,
            ExperimentKind::Colour,
            ExperimentKind::HsvColourOneRed,
            ExperimentKind::MusicalNote,
            ExperimentKind::MusicalNoteFlatSharp,
        ]
    }
}

impl fmt::Display for ExperimentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExperimentKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ExperimentKind::from_name(s))
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
