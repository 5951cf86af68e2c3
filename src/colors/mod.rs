//! Label-to-color classification
//!
//! Assigns a stable color to a chart label under one of several experiment
//! kinds. Tables are static; classification is a pure function.
//!
//! - Colour kinds look the full label up in a fixed table
//! - Musical note kinds look up the label's first character
//! - Month and weekday kinds strip qualifier prefixes first and degrade to a
//!   neutral color
//! - Any other kind uses a ten-color categorical palette

pub mod classifier;
pub mod kind;
pub mod palette;

pub use classifier::{color_for, try_color_for, Classifier, Color, ColorScale};
pub use kind::{ExperimentKind, KindFamily};
