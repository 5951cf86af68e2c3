//! Raw ledger record definition and validation

use crate::error::{ComputeError, RecordDefect};
use crate::types::FinancialRecord;
use serde::{Deserialize, Serialize};

/// A code or numeric cell as delivered by the record source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Number(f64),
}

impl CellValue {
    /// Render the cell as a code string; numbers lose no digits for integers
    pub fn as_code(&self) -> String {
        match self {
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Number(n) => n.to_string(),
        }
    }

    /// Interpret the cell as a number; unparseable text yields NaN
    pub fn as_number(&self) -> f64 {
        match self {
            CellValue::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
            CellValue::Integer(i) => *i as f64,
            CellValue::Number(n) => *n,
        }
    }
}

/// One ledger row before validation
///
/// Every field is optional so that a missing column surfaces as a
/// `MalformedRecord` with the offending field name rather than a JSON error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFinancialRecord {
    #[serde(
        rename = "categoryCode",
        alias = "category_code",
        alias = "inkomsttyp",
        default
    )]
    pub category_code: Option<CellValue>,

    #[serde(
        rename = "categoryName",
        alias = "category_name",
        alias = "inkomsttypsnamn",
        default
    )]
    pub category_name: Option<CellValue>,

    #[serde(
        rename = "mainGroupCode",
        alias = "main_group_code",
        alias = "inkomsthuvudgrupp",
        default
    )]
    pub main_group_code: Option<CellValue>,

    #[serde(
        rename = "mainGroupName",
        alias = "main_group_name",
        alias = "inkomsthuvudgruppsnamn",
        default
    )]
    pub main_group_name: Option<CellValue>,

    #[serde(
        rename = "titleGroupCode",
        alias = "title_group_code",
        alias = "inkomsttitelgrupp",
        default
    )]
    pub title_group_code: Option<CellValue>,

    #[serde(
        rename = "titleGroupName",
        alias = "title_group_name",
        alias = "inkomsttitelgruppsnamn",
        default
    )]
    pub title_group_name: Option<CellValue>,

    #[serde(
        rename = "titleCode",
        alias = "title_code",
        alias = "inkomsttitel",
        default
    )]
    pub title_code: Option<CellValue>,

    #[serde(
        rename = "titleName",
        alias = "title_name",
        alias = "inkomsttitelsnamn",
        default
    )]
    pub title_name: Option<CellValue>,

    #[serde(rename = "year", alias = "år", default)]
    pub year: Option<CellValue>,

    #[serde(
        rename = "budgetAmount",
        alias = "budget",
        alias = "budget_amount",
        alias = "statens_budget",
        default
    )]
    pub budget_amount: Option<CellValue>,

    #[serde(
        rename = "outcomeAmount",
        alias = "outcome",
        alias = "outcome_amount",
        alias = "utfall",
        default
    )]
    pub outcome_amount: Option<CellValue>,
}

impl RawFinancialRecord {
    /// Validate the row and convert it into a typed record
    ///
    /// `index` is the row's position in its batch and is carried into the error.
    pub fn validate(&self, index: usize) -> Result<FinancialRecord, ComputeError> {
        self.to_record()
            .map_err(|reason| ComputeError::MalformedRecord { index, reason })
    }

    fn to_record(&self) -> Result<FinancialRecord, RecordDefect> {
        let record = FinancialRecord {
            category_code: required_text(&self.category_code, "categoryCode")?,
            category_name: required_text(&self.category_name, "categoryName")?,
            main_group_code: required_text(&self.main_group_code, "mainGroupCode")?,
            main_group_name: required_text(&self.main_group_name, "mainGroupName")?,
            title_group_code: required_text(&self.title_group_code, "titleGroupCode")?,
            title_group_name: required_text(&self.title_group_name, "titleGroupName")?,
            title_code: required_text(&self.title_code, "titleCode")?,
            title_name: required_text(&self.title_name, "titleName")?,
            year: required_year(&self.year)?,
            budget_amount: required_number(&self.budget_amount, "budgetAmount")?,
            outcome_amount: required_number(&self.outcome_amount, "outcomeAmount")?,
        };
        Ok(record)
    }
}

impl From<&FinancialRecord> for RawFinancialRecord {
    fn from(record: &FinancialRecord) -> Self {
        let text = |s: &str| Some(CellValue::Text(s.to_string()));
        RawFinancialRecord {
            category_code: text(&record.category_code),
            category_name: text(&record.category_name),
            main_group_code: text(&record.main_group_code),
            main_group_name: text(&record.main_group_name),
            title_group_code: text(&record.title_group_code),
            title_group_name: text(&record.title_group_name),
            title_code: text(&record.title_code),
            title_name: text(&record.title_name),
            year: Some(CellValue::Integer(i64::from(record.year))),
            budget_amount: Some(CellValue::Number(record.budget_amount)),
            outcome_amount: Some(CellValue::Number(record.outcome_amount)),
        }
    }
}

/// Check an already typed record against the same rules as `RawFinancialRecord::validate`
pub fn record_defect(record: &FinancialRecord) -> Option<RecordDefect> {
    let text_fields = [
        (&record.category_code, "categoryCode"),
        (&record.category_name, "categoryName"),
        (&record.main_group_code, "mainGroupCode"),
        (&record.main_group_name, "mainGroupName"),
        (&record.title_group_code, "titleGroupCode"),
        (&record.title_group_name, "titleGroupName"),
        (&record.title_code, "titleCode"),
        (&record.title_name, "titleName"),
    ];
    if let Some((_, name)) = text_fields.iter().find(|(value, _)| value.trim().is_empty()) {
        return Some(RecordDefect::MissingField(*name));
    }
    if !record.budget_amount.is_finite() {
        return Some(RecordDefect::NonFiniteNumber("budgetAmount"));
    }
    if !record.outcome_amount.is_finite() {
        return Some(RecordDefect::NonFiniteNumber("outcomeAmount"));
    }
    None
}

fn required_text(cell: &Option<CellValue>, field: &'static str) -> Result<String, RecordDefect> {
    match cell.as_ref().map(CellValue::as_code) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(RecordDefect::MissingField(field)),
    }
}

fn required_number(cell: &Option<CellValue>, field: &'static str) -> Result<f64, RecordDefect> {
    let value = cell
        .as_ref()
        .ok_or(RecordDefect::MissingField(field))?
        .as_number();
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RecordDefect::NonFiniteNumber(field))
    }
}

fn required_year(cell: &Option<CellValue>) -> Result<i32, RecordDefect> {
    let value = required_number(cell, "year")?;
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return Err(RecordDefect::NonIntegralYear);
    }
    Ok(value as i32)
}
