//! Adapter for turning record source payloads into validated records
//!
//! The record source hands over either a JSON array of rows or NDJSON (one
//! row per line). This module parses both into `RawFinancialRecord`s and
//! validates them into `FinancialRecord`s.

use crate::error::{ComputeError, RecordDefect};
use crate::schema::record::RawFinancialRecord;
use crate::types::FinancialRecord;

/// Adapter for converting record source payloads to typed records
pub struct RecordAdapter;

impl RecordAdapter {
    /// Parse a JSON string containing an array of rows
    pub fn parse_array(json: &str) -> Result<Vec<RawFinancialRecord>, ComputeError> {
        let records: Vec<RawFinancialRecord> = serde_json::from_str(json)?;
        Ok(records)
    }

    /// Parse NDJSON (newline-delimited JSON) containing one row per line
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<RawFinancialRecord>, ComputeError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawFinancialRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(ComputeError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Validate every row, failing on the first malformed one
    pub fn to_records(raw: &[RawFinancialRecord]) -> Result<Vec<FinancialRecord>, ComputeError> {
        raw.iter()
            .enumerate()
            .map(|(index, record)| record.validate(index))
            .collect()
    }

    /// Validate a batch and report every malformed row
    pub fn validate_records(raw: &[RawFinancialRecord]) -> Vec<ValidationResult> {
        raw.iter()
            .enumerate()
            .filter_map(|(index, record)| match record.validate(index) {
                Ok(_) => None,
                Err(ComputeError::MalformedRecord { reason, .. }) => Some(ValidationResult {
                    index,
                    title_code: record.title_code.as_ref().map(|c| c.as_code()),
                    defect: reason,
                }),
                Err(_) => None,
            })
            .collect()
    }
}

/// A malformed row found during batch validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub index: usize,
    pub title_code: Option<String>,
    pub defect: RecordDefect,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW_A: &str = r#"{"categoryCode":"1000","categoryName":"Taxes","mainGroupCode":"1100","mainGroupName":"Direct","titleGroupCode":"1110","titleGroupName":"Income","titleCode":"1111","titleName":"State tax","year":2020,"budget":100,"outcome":90}"#;
    const ROW_B: &str = r#"{"categoryCode":"1000","categoryName":"Taxes","mainGroupCode":"1100","mainGroupName":"Direct","titleGroupCode":"1110","titleGroupName":"Income","titleCode":"1112","titleName":"Local tax","year":2020,"budget":50,"outcome":45}"#;

    #[test]
    fn test_parse_array() {
        let json = format!("[{ROW_A},{ROW_B}]");
        let raw = RecordAdapter::parse_array(&json).unwrap();
        assert_eq!(raw.len(), 2);

        let records = RecordAdapter::to_records(&raw).unwrap();
        assert_eq!(records[1].title_code, "1112");
        assert_eq!(records[1].outcome_amount, 45.0);
    }

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let ndjson = format!("{ROW_A}\n\n   \n{ROW_B}\n");
        let raw = RecordAdapter::parse_ndjson(&ndjson).unwrap();
        assert_eq!(raw.len(), 2);
    }

    #[test]
    fn test_parse_ndjson_reports_line_number() {
        let ndjson = format!("{ROW_A}\n{{not json\n");
        let err = RecordAdapter::parse_ndjson(&ndjson).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_validate_records_lists_every_defect() {
        let json = format!(r#"[{ROW_A}, {{"titleCode": "9"}}, {ROW_B}, {{}}]"#);
        let raw = RecordAdapter::parse_array(&json).unwrap();

        let results = RecordAdapter::validate_records(&raw);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].index, 1);
        assert_eq!(results[0].title_code.as_deref(), Some("9"));
        assert_eq!(results[1].index, 3);
        assert_eq!(results[1].defect, RecordDefect::MissingField("categoryCode"));

        let err = RecordAdapter::to_records(&raw).unwrap_err();
        assert!(matches!(err, ComputeError::MalformedRecord { index: 1, .. }));
    }
}
