//! Report encoding
//!
//! This module wraps aggregated year trees in a `FinanceReport` envelope with
//! producer metadata and a consistency block, then serializes it to JSON.

use crate::aggregator::AggregationOutcome;
use crate::error::ComputeError;
use crate::types::{FinanceReport, ReportProducer, YearConsistency, YearlyFinancialData};
use crate::{CHARTFLOW_VERSION, PRODUCER_NAME};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Report encoder for producing renderer-facing JSON
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode an aggregation outcome into a report
    pub fn encode(&self, outcome: &AggregationOutcome) -> FinanceReport {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: CHARTFLOW_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        FinanceReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            computed_at_utc: Utc::now().to_rfc3339(),
            years: outcome.years.clone(),
            consistency: outcome.years.iter().map(consistency).collect(),
            skipped_records: outcome.skipped.iter().map(|s| s.index).collect(),
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(&self, outcome: &AggregationOutcome) -> Result<String, ComputeError> {
        let report = self.encode(outcome);
        serde_json::to_string_pretty(&report)
            .map_err(|e| ComputeError::EncodingError(e.to_string()))
    }
}

fn consistency(year: &YearlyFinancialData) -> YearConsistency {
    YearConsistency {
        year: year.year,
        node_outcome_total: year.node_outcome_total(),
        divergence: year.overwritten_outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{transform, AggregationOutcome, SkippedRecord};
    use crate::error::RecordDefect;
    use crate::types::FinancialRecord;

    fn record(title_code: &str, outcome: f64) -> FinancialRecord {
        FinancialRecord {
            category_code: "1000".to_string(),
            category_name: "Taxes".to_string(),
            main_group_code: "1100".to_string(),
            main_group_name: "Direct".to_string(),
            title_group_code: "1110".to_string(),
            title_group_name: "Income".to_string(),
            title_code: title_code.to_string(),
            title_name: "Title".to_string(),
            year: 2020,
            budget_amount: outcome,
            outcome_amount: outcome,
        }
    }

    #[test]
    fn test_encode_report_metadata() {
        let years = transform(&[record("1111", 10.0)]).unwrap();
        let outcome = AggregationOutcome {
            years,
            skipped: vec![SkippedRecord {
                index: 4,
                defect: RecordDefect::NonIntegralYear,
            }],
        };

        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let report = encoder.encode(&outcome);

        assert_eq!(report.report_version, REPORT_VERSION);
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.instance_id, "test-instance");
        assert!(chrono::DateTime::parse_from_rfc3339(&report.computed_at_utc).is_ok());
        assert_eq!(report.skipped_records, vec![4]);
        assert_eq!(report.consistency[0].divergence, 0.0);
    }

    #[test]
    fn test_consistency_flags_overwritten_titles() {
        let years = transform(&[record("1111", 10.0), record("1111", 4.0)]).unwrap();
        let outcome = AggregationOutcome {
            years,
            skipped: Vec::new(),
        };

        let report = ReportEncoder::new().encode(&outcome);
        assert_eq!(report.consistency[0].node_outcome_total, 4.0);
        assert_eq!(report.consistency[0].divergence, 10.0);
    }

    #[test]
    fn test_consistency_ignores_summation_order() {
        // Unique codes, inserted out of code order, at ledger magnitudes
        let years = transform(&[
            record("1115", 612_345_678_901.37),
            record("1111", 0.29),
            record("1114", 98_765_432_109.11),
            record("1112", 17_000_000_000.73),
            record("1113", 0.07),
        ])
        .unwrap();
        let outcome = AggregationOutcome {
            years,
            skipped: Vec::new(),
        };

        let report = ReportEncoder::new().encode(&outcome);
        assert_eq!(report.consistency[0].divergence, 0.0);
        assert_eq!(outcome.years[0].overwritten_outcome, 0.0);
    }

    #[test]
    fn test_consistency_reports_exact_overwritten_outcome() {
        let years = transform(&[
            record("1112", 98_765_432_109.11),
            record("1111", 612_345_678_901.37),
            record("1112", 0.29),
        ])
        .unwrap();
        let outcome = AggregationOutcome {
            years,
            skipped: Vec::new(),
        };

        let report = ReportEncoder::new().encode(&outcome);
        assert_eq!(report.consistency[0].divergence, 98_765_432_109.11);
    }

    #[test]
    fn test_encode_to_json() {
        let outcome = AggregationOutcome {
            years: transform(&[record("1111", 1.5)]).unwrap(),
            skipped: Vec::new(),
        };

        let json = ReportEncoder::new().encode_to_json(&outcome).unwrap();
        assert!(json.contains("\"reportVersion\""));
        assert!(json.contains("\"computedAtUtc\""));
        assert!(json.contains("\"subCategories\""));
        // Empty skip lists are omitted
        assert!(!json.contains("skippedRecords"));
    }
}
