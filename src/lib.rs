//! Chartflow - data preparation for budget and model-state charts
//!
//! Chartflow turns flat ledger rows into per-year hierarchical totals and
//! assigns deterministic colors to labels of embedding-projection experiments.
//!
//! ## Modules
//!
//! - **Finance Pipeline**: ledger rows → validated records → year trees → report JSON
//! - **Colors**: label → hex color per experiment kind
//! - **Layers**: projected hidden states → colored, label-flagged points

pub mod aggregator;
pub mod colors;
pub mod config;
pub mod encoder;
pub mod error;
pub mod layers;
pub mod pipeline;
pub mod schema;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use aggregator::{transform, AggregationOptions, AggregationOutcome, Aggregator};
pub use colors::{color_for, try_color_for, Classifier, Color, ColorScale, ExperimentKind};
pub use config::Config;
pub use error::ComputeError;
pub use pipeline::{records_to_report_json, FinanceProcessor};
pub use types::{FinanceReport, FinancialRecord, YearlyFinancialData};

// Schema exports
pub use schema::{RawFinancialRecord, RecordAdapter};

// Layer exports
pub use layers::{prepare_points, LayerData, ModelName};

/// Chartflow version embedded in every report
pub const CHARTFLOW_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "chartflow";
