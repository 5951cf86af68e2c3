//! Pipeline orchestration
//!
//! This module provides the public API for the finance side of Chartflow.
//! It orchestrates the full pipeline from record-source JSON to report JSON.

use crate::aggregator::{
    AggregationOptions, AggregationOutcome, Aggregator, MalformedPolicy, SkippedRecord,
};
use crate::config::Config;
use crate::encoder::ReportEncoder;
use crate::error::ComputeError;
use crate::schema::{RawFinancialRecord, RecordAdapter};
use crate::types::FinancialRecord;
use tracing::{info, warn};

/// Convert a JSON array of ledger rows to a report JSON string.
///
/// # Arguments
/// * `records_json` - JSON array of rows as delivered by the record source
///
/// # Returns
/// Pretty-printed report JSON with one tree per year
///
/// # Example
/// ```ignore
/// let report = records_to_report_json(records_json)?;
/// ```
pub fn records_to_report_json(records_json: String) -> Result<String, ComputeError> {
    FinanceProcessor::new().process_json(&records_json)
}

/// Processor holding aggregation options and a report encoder.
///
/// Use this when the same settings apply to several batches.
pub struct FinanceProcessor {
    aggregator: Aggregator,
    encoder: ReportEncoder,
}

impl Default for FinanceProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl FinanceProcessor {
    /// Create a new processor with default settings
    pub fn new() -> Self {
        Self::with_options(AggregationOptions::default())
    }

    /// Create a processor with explicit aggregation options
    pub fn with_options(options: AggregationOptions) -> Self {
        Self {
            aggregator: Aggregator::new(options),
            encoder: ReportEncoder::new(),
        }
    }

    /// Create a processor from loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self::with_options(config.aggregation.options())
    }

    pub fn options(&self) -> AggregationOptions {
        self.aggregator.options()
    }

    /// Process a JSON array of rows into report JSON
    pub fn process_json(&self, json: &str) -> Result<String, ComputeError> {
        let raw = RecordAdapter::parse_array(json)?;
        let outcome = self.aggregate_raw(&raw)?;
        self.encoder.encode_to_json(&outcome)
    }

    /// Process NDJSON rows into report JSON
    pub fn process_ndjson(&self, ndjson: &str) -> Result<String, ComputeError> {
        let raw = RecordAdapter::parse_ndjson(ndjson)?;
        let outcome = self.aggregate_raw(&raw)?;
        self.encoder.encode_to_json(&outcome)
    }

    /// Validate and aggregate untyped rows.
    ///
    /// Skipped indices refer to positions in `raw`.
    pub fn aggregate_raw(
        &self,
        raw: &[RawFinancialRecord],
    ) -> Result<AggregationOutcome, ComputeError> {
        let mut skipped = Vec::new();
        let mut records = Vec::with_capacity(raw.len());

        for (index, row) in raw.iter().enumerate() {
            match row.validate(index) {
                Ok(record) => records.push(record),
                Err(ComputeError::MalformedRecord { index, reason })
                    if self.options().malformed == MalformedPolicy::Skip =>
                {
                    warn!(index, defect = %reason, "skipping malformed row");
                    skipped.push(SkippedRecord {
                        index,
                        defect: reason,
                    });
                }
                Err(e) => return Err(e),
            }
        }

        let mut outcome = self.aggregator.aggregate(&records)?;
        // Typed records were all valid, so the aggregator skipped nothing
        outcome.skipped = skipped;

        info!(
            rows = raw.len(),
            years = outcome.years.len(),
            skipped = outcome.skipped.len(),
            "aggregated ledger rows"
        );
        Ok(outcome)
    }

    /// Aggregate already typed records
    pub fn aggregate(&self, records: &[FinancialRecord]) -> Result<AggregationOutcome, ComputeError> {
        self.aggregator.aggregate(records)
    }

    /// Encode an outcome with this processor's encoder
    pub fn encode(&self, outcome: &AggregationOutcome) -> Result<String, ComputeError> {
        self.encoder.encode_to_json(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::DuplicatePolicy;
    use crate::types::FinanceReport;

    const ROWS: &str = r#"[
        {"categoryCode":"1000","categoryName":"Taxes","mainGroupCode":"1100","mainGroupName":"Direct","titleGroupCode":"1110","titleGroupName":"Income","titleCode":"1111","titleName":"State tax","year":2020,"budget":100,"outcome":90},
        {"categoryCode":"1000","categoryName":"Taxes","mainGroupCode":"1100","mainGroupName":"Direct","titleGroupCode":"1110","titleGroupName":"Income","titleCode":"1112","titleName":"Local tax","year":2020,"budget":50,"outcome":45}
    ]"#;

    #[test]
    fn test_records_to_report_json() {
        let json = records_to_report_json(ROWS.to_string()).unwrap();
        let report: FinanceReport = serde_json::from_str(&json).unwrap();

        assert_eq!(report.years.len(), 1);
        assert_eq!(report.years[0].year, 2020);
        assert_eq!(report.years[0].categories["1000"].total, 135.0);
        assert_eq!(report.years[0].total_outcome, 135.0);
    }

    #[test]
    fn test_process_ndjson() {
        let rows: Vec<serde_json::Value> = serde_json::from_str(ROWS).unwrap();
        let ndjson = rows
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join("\n");

        let json = FinanceProcessor::new().process_ndjson(&ndjson).unwrap();
        let report: FinanceReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report.years[0].title_count(), 2);
    }

    #[test]
    fn test_skip_policy_keeps_original_indices() {
        let json = r#"[
            {"titleCode": "broken"},
            {"categoryCode":"1","categoryName":"a","mainGroupCode":"2","mainGroupName":"b","titleGroupCode":"3","titleGroupName":"c","titleCode":"4","titleName":"d","year":2021,"budget":1,"outcome":2}
        ]"#;
        let processor = FinanceProcessor::with_options(AggregationOptions {
            malformed: MalformedPolicy::Skip,
            ..Default::default()
        });

        let raw = RecordAdapter::parse_array(json).unwrap();
        let outcome = processor.aggregate_raw(&raw).unwrap();
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].index, 0);
        assert_eq!(outcome.years[0].year, 2021);

        // The default policy rejects the same batch
        let err = FinanceProcessor::new().process_json(json).unwrap_err();
        assert!(matches!(err, ComputeError::MalformedRecord { index: 0, .. }));
    }

    #[test]
    fn test_from_config() {
        let config = Config::from_toml("[aggregation]\nduplicates = \"reject\"\n").unwrap();
        let processor = FinanceProcessor::from_config(&config);
        assert_eq!(processor.options().duplicates, DuplicatePolicy::Reject);
    }
}
