//! Hierarchical aggregation
//!
//! This module groups flat ledger records into one tree per year
//! (Category → MainGroup → TitleGroup → Title) and computes outcome totals
//! bottom-up in a separate finalization pass.
//!
//! - Titles with a repeated code are overwritten (last write wins) unless
//!   `DuplicatePolicy::Reject` is selected.
//! - `total_budget`/`total_outcome` on a year accumulate every record,
//!   including overwritten ones.
//! - Years come out in ascending order.

use crate::error::{ComputeError, RecordDefect};
use crate::schema::record_defect;
use crate::types::{Category, FinancialRecord, MainGroup, Title, TitleGroup, YearlyFinancialData};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// What to do with a record that fails validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Fail the whole batch on the first malformed record
    #[default]
    Reject,
    /// Leave the record out and report it in `AggregationOutcome::skipped`
    Skip,
}

/// What to do when a title code repeats within a title group and year
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Replace the earlier title entry with the later one
    #[default]
    Overwrite,
    /// Fail with `ComputeError::DuplicateTitle`
    Reject,
}

/// Aggregation settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationOptions {
    #[serde(default)]
    pub malformed: MalformedPolicy,
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
}

/// A record left out under `MalformedPolicy::Skip`
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub index: usize,
    pub defect: RecordDefect,
}

/// Result of an aggregation run
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationOutcome {
    /// One finalized tree per year, ascending by year
    pub years: Vec<YearlyFinancialData>,
    /// Records that were skipped (always empty under `MalformedPolicy::Reject`)
    pub skipped: Vec<SkippedRecord>,
}

/// Group records into per-year trees using the default options.
///
/// # Example
/// ```ignore
/// let years = transform(&records)?;
/// let first = &years[0];
/// println!("{} total outcome: {}", first.year, first.total_outcome);
/// ```
pub fn transform(records: &[FinancialRecord]) -> Result<Vec<YearlyFinancialData>, ComputeError> {
    Aggregator::default()
        .aggregate(records)
        .map(|outcome| outcome.years)
}

/// Aggregator configured with malformed-record and duplicate-title policies
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    options: AggregationOptions,
}

impl Aggregator {
    pub fn new(options: AggregationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> AggregationOptions {
        self.options
    }

    /// Build and finalize one tree per year.
    ///
    /// Validation runs over the whole batch before any tree is built, so a
    /// rejected batch never yields partial output.
    pub fn aggregate(&self, records: &[FinancialRecord]) -> Result<AggregationOutcome, ComputeError> {
        let mut skipped = Vec::new();
        let mut by_year: BTreeMap<i32, Vec<&FinancialRecord>> = BTreeMap::new();

        for (index, record) in records.iter().enumerate() {
            if let Some(defect) = record_defect(record) {
                match self.options.malformed {
                    MalformedPolicy::Reject => {
                        return Err(ComputeError::MalformedRecord {
                            index,
                            reason: defect,
                        });
                    }
                    MalformedPolicy::Skip => {
                        warn!(index, %defect, "skipping malformed record");
                        skipped.push(SkippedRecord { index, defect });
                        continue;
                    }
                }
            }
            by_year.entry(record.year).or_default().push(record);
        }

        let mut years = Vec::with_capacity(by_year.len());
        for (year, year_records) in by_year {
            let mut builder = YearBuilder::new(year, self.options.duplicates);
            for record in year_records {
                builder.insert(record)?;
            }
            let data = builder.finish();
            debug!(
                year,
                categories = data.categories.len(),
                titles = data.title_count(),
                total_outcome = data.total_outcome,
                "built year tree"
            );
            years.push(data);
        }

        Ok(AggregationOutcome { years, skipped })
    }
}

/// Accumulator for building a single year's tree
struct YearBuilder {
    data: YearlyFinancialData,
    duplicates: DuplicatePolicy,
}

impl YearBuilder {
    fn new(year: i32, duplicates: DuplicatePolicy) -> Self {
        Self {
            data: YearlyFinancialData::new(year),
            duplicates,
        }
    }

    fn insert(&mut self, record: &FinancialRecord) -> Result<(), ComputeError> {
        let category = self
            .data
            .categories
            .entry(record.category_code.clone())
            .or_insert_with(|| Category {
                code: record.category_code.clone(),
                name: record.category_name.clone(),
                sub_categories: BTreeMap::new(),
                total: 0.0,
            });

        let main_group = category
            .sub_categories
            .entry(record.main_group_code.clone())
            .or_insert_with(|| MainGroup {
                code: record.main_group_code.clone(),
                name: record.main_group_name.clone(),
                title_groups: BTreeMap::new(),
                total: 0.0,
            });

        let title_group = main_group
            .title_groups
            .entry(record.title_group_code.clone())
            .or_insert_with(|| TitleGroup {
                code: record.title_group_code.clone(),
                name: record.title_group_name.clone(),
                titles: BTreeMap::new(),
                total: 0.0,
            });

        let title = Title {
            code: record.title_code.clone(),
            name: record.title_name.clone(),
            budget: record.budget_amount,
            outcome: record.outcome_amount,
        };

        match title_group.titles.entry(record.title_code.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(title);
            }
            Entry::Occupied(mut slot) => match self.duplicates {
                DuplicatePolicy::Overwrite => {
                    debug!(
                        year = record.year,
                        title = %record.title_code,
                        previous_outcome = slot.get().outcome,
                        outcome = record.outcome_amount,
                        "overwriting duplicate title"
                    );
                    let previous = slot.insert(title);
                    self.data.overwritten_outcome += previous.outcome;
                }
                DuplicatePolicy::Reject => {
                    return Err(ComputeError::DuplicateTitle {
                        year: record.year,
                        category: record.category_code.clone(),
                        main_group: record.main_group_code.clone(),
                        title_group: record.title_group_code.clone(),
                        title: record.title_code.clone(),
                    });
                }
            },
        }

        self.data.total_budget += record.budget_amount;
        self.data.total_outcome += record.outcome_amount;
        Ok(())
    }

    fn finish(mut self) -> YearlyFinancialData {
        finalize_totals(&mut self.data);
        self.data
    }
}

/// Recompute every node total bottom-up from the title outcomes.
///
/// Previously stored totals are overwritten, so running this more than once
/// gives the same result. Year-level `total_budget`/`total_outcome` are left
/// untouched.
pub fn finalize_totals(data: &mut YearlyFinancialData) {
    for category in data.categories.values_mut() {
        let mut category_total = 0.0;
        for main_group in category.sub_categories.values_mut() {
            let mut main_total = 0.0;
            for title_group in main_group.title_groups.values_mut() {
                title_group.total = title_group.titles.values().map(|t| t.outcome).sum();
                main_total += title_group.total;
            }
            main_group.total = main_total;
            category_total += main_total;
        }
        category.total = category_total;
    }
}
