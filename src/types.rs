//! Core types for the Chartflow finance pipeline
//!
//! This module defines the data structures that flow through the aggregator:
//! flat validated records in, one four-level tree of category totals per year out.
//!
//! Tree levels, broadest to narrowest: Category → MainGroup → TitleGroup → Title.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One flat ledger row describing a single title's budget and outcome for a year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRecord {
    /// Category code (e.g. "1000")
    pub category_code: String,
    /// Category name (e.g. "State tax revenue")
    pub category_name: String,
    /// Main group code (e.g. "1100")
    pub main_group_code: String,
    /// Main group name
    pub main_group_name: String,
    /// Title group code (e.g. "1110")
    pub title_group_code: String,
    /// Title group name
    pub title_group_name: String,
    /// Title code (e.g. "1111")
    pub title_code: String,
    /// Title name
    pub title_name: String,
    /// Fiscal year
    pub year: i32,
    /// Budgeted amount
    pub budget_amount: f64,
    /// Actual outcome amount
    pub outcome_amount: f64,
}

/// Leaf of the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub code: String,
    pub name: String,
    pub budget: f64,
    pub outcome: f64,
}

/// Third level: titles keyed by title code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleGroup {
    pub code: String,
    pub name: String,
    pub titles: BTreeMap<String, Title>,
    /// Sum of the titles' outcomes
    pub total: f64,
}

/// Second level: title groups keyed by title group code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainGroup {
    pub code: String,
    pub name: String,
    pub title_groups: BTreeMap<String, TitleGroup>,
    /// Sum of the title groups' totals
    pub total: f64,
}

/// Top level: main groups keyed by main group code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub code: String,
    pub name: String,
    pub sub_categories: BTreeMap<String, MainGroup>,
    /// Sum of the main groups' totals
    pub total: f64,
}

/// Aggregated tree for one year
///
/// `total_budget` and `total_outcome` are running sums over every record seen
/// for the year. They are not derived from the tree, so when a title code
/// repeats they include the overwritten record while the node totals do not.
/// `overwritten_outcome` is the exact outcome of those replaced titles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyFinancialData {
    pub year: i32,
    pub categories: BTreeMap<String, Category>,
    pub total_budget: f64,
    pub total_outcome: f64,
    #[serde(default)]
    pub overwritten_outcome: f64,
}

/// One bar of the per-category chart series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBar {
    pub code: String,
    pub name: String,
    pub total: f64,
}

impl YearlyFinancialData {
    /// Create an empty tree for a year
    pub fn new(year: i32) -> Self {
        Self {
            year,
            categories: BTreeMap::new(),
            total_budget: 0.0,
            total_outcome: 0.0,
            overwritten_outcome: 0.0,
        }
    }

    /// Sum of the category totals (outcome-only, derived from the tree)
    pub fn node_outcome_total(&self) -> f64 {
        self.categories.values().map(|c| c.total).sum()
    }

    /// Number of title leaves in the tree
    pub fn title_count(&self) -> usize {
        self.categories
            .values()
            .flat_map(|c| c.sub_categories.values())
            .flat_map(|m| m.title_groups.values())
            .map(|g| g.titles.len())
            .sum()
    }

    /// Per-category outcome totals in category code order
    pub fn category_bars(&self) -> Vec<CategoryBar> {
        self.categories
            .values()
            .map(|c| CategoryBar {
                code: c.code.clone(),
                name: c.name.clone(),
                total: c.total,
            })
            .collect()
    }

    /// Look up a title by its full path
    pub fn title(
        &self,
        category: &str,
        main_group: &str,
        title_group: &str,
        title: &str,
    ) -> Option<&Title> {
        self.categories
            .get(category)?
            .sub_categories
            .get(main_group)?
            .title_groups
            .get(title_group)?
            .titles
            .get(title)
    }
}

/// Producer metadata embedded in every report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Per-year reconciliation between record-level sums and the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearConsistency {
    pub year: i32,
    /// Sum of category totals
    pub node_outcome_total: f64,
    /// Outcome of titles replaced by a later record with the same code;
    /// zero when no title was overwritten
    pub divergence: f64,
}

/// Serialized output handed to the chart renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub years: Vec<YearlyFinancialData>,
    pub consistency: Vec<YearConsistency>,
    /// Indices of records left out under the skip policy
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_records: Vec<usize>,
}

/// Find the tree for a given year
pub fn find_year(years: &[YearlyFinancialData], year: i32) -> Option<&YearlyFinancialData> {
    years.iter().find(|y| y.year == year)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_year() -> YearlyFinancialData {
        let mut titles = BTreeMap::new();
        titles.insert(
            "1111".to_string(),
            Title {
                code: "1111".to_string(),
                name: "State tax".to_string(),
                budget: 100.0,
                outcome: 90.0,
            },
        );
        let mut title_groups = BTreeMap::new();
        title_groups.insert(
            "1110".to_string(),
            TitleGroup {
                code: "1110".to_string(),
                name: "Income".to_string(),
                titles,
                total: 90.0,
            },
        );
        let mut sub_categories = BTreeMap::new();
        sub_categories.insert(
            "1100".to_string(),
            MainGroup {
                code: "1100".to_string(),
                name: "Direct".to_string(),
                title_groups,
                total: 90.0,
            },
        );
        let mut year = YearlyFinancialData::new(2020);
        year.categories.insert(
            "1000".to_string(),
            Category {
                code: "1000".to_string(),
                name: "Taxes".to_string(),
                sub_categories,
                total: 90.0,
            },
        );
        year
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let json = serde_json::to_string(&make_year()).unwrap();

        assert!(json.contains("\"subCategories\""));
        assert!(json.contains("\"titleGroups\""));
        assert!(json.contains("\"totalBudget\""));
        assert!(json.contains("\"totalOutcome\""));
    }

    #[test]
    fn test_title_lookup_and_bars() {
        let year = make_year();

        let title = year.title("1000", "1100", "1110", "1111").unwrap();
        assert_eq!(title.name, "State tax");
        assert!(year.title("1000", "1100", "1110", "9999").is_none());

        let bars = year.category_bars();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].name, "Taxes");
        assert_eq!(bars[0].total, 90.0);
        assert_eq!(year.title_count(), 1);
    }

    #[test]
    fn test_find_year() {
        let years = vec![YearlyFinancialData::new(2019), make_year()];
        assert_eq!(find_year(&years, 2020).map(|y| y.year), Some(2020));
        assert!(find_year(&years, 2021).is_none());
    }
}
