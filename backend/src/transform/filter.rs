//! Sidebar filters: member types, age range and tenure-year range.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::models::{CustomerRecord, Dataset, MemberType, Metric};

/// Conjunction of the three sidebar predicates.
///
/// Ranges are inclusive on both ends. A reversed range (`lo > hi`) or an
/// empty type selection simply matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub types: BTreeSet<MemberType>,
    pub age: RangeInclusive<i64>,
    pub year: RangeInclusive<i64>,
}

impl FilterCriteria {
    pub fn new(
        types: impl IntoIterator<Item = MemberType>,
        age: RangeInclusive<i64>,
        year: RangeInclusive<i64>,
    ) -> Self {
        Self {
            types: types.into_iter().collect(),
            age,
            year,
        }
    }

    /// Build criteria from raw type labels, normalized like the loader does.
    ///
    /// Labels that normalize to nothing (blank, non-member) are ignored.
    pub fn from_labels<'a>(
        labels: impl IntoIterator<Item = &'a str>,
        age: RangeInclusive<i64>,
        year: RangeInclusive<i64>,
    ) -> Self {
        Self::new(labels.into_iter().filter_map(MemberType::parse), age, year)
    }

    /// Everything in `dataset`: all types and the full observed ranges.
    pub fn all(dataset: &Dataset) -> Self {
        Self {
            types: dataset.member_types(),
            age: dataset.age_bounds().unwrap_or(0..=0),
            year: dataset.year_bounds().unwrap_or(0..=0),
        }
    }

    pub fn matches(&self, record: &CustomerRecord) -> bool {
        self.types.contains(&record.member_type)
            && self.age.contains(&record.age)
            && self.year.contains(&record.year)
    }
}

/// Rows of a dataset that passed a filter, in load order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilteredView {
    records: Vec<CustomerRecord>,
}

impl FilteredView {
    pub fn from_records(records: Vec<CustomerRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One metric column, in row order.
    pub fn column(&self, metric: Metric) -> Vec<f64> {
        self.records.iter().map(|r| r.metric(metric)).collect()
    }
}

/// Apply `criteria` to `dataset`, copying the matching rows.
pub fn apply_filter(dataset: &Dataset, criteria: &FilterCriteria) -> FilteredView {
    FilteredView {
        records: dataset
            .iter()
            .filter(|r| criteria.matches(r))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LoadStats;

    fn record(member_type: &str, age: i64, year: i64, total: f64) -> CustomerRecord {
        CustomerRecord {
            member_type: MemberType::parse(member_type).unwrap(),
            age,
            year,
            movies_watched: 2.0,
            snacks_popcorn: 1.0,
            total,
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(
            vec![
                record("Gold", 30, 2, 50.0),
                record("Silver", 70, 6, 90.0),
                record("Bronze", 18, 1, 20.0),
                record("Gold", 60, 5, 75.0),
            ],
            LoadStats::default(),
        )
    }

    #[test]
    fn test_filter_is_conjunctive_and_inclusive() {
        let criteria = FilterCriteria::from_labels(["Gold", "Silver"], 18..=60, 1..=5);
        let view = apply_filter(&dataset(), &criteria);

        let totals = view.column(Metric::TotalSpending);
        assert_eq!(totals, vec![50.0, 75.0]);
    }

    #[test]
    fn test_filter_only_returns_matching_rows() {
        let data = dataset();
        let criteria = FilterCriteria::from_labels(["bronze", "gold"], 20..=65, 2..=6);
        let view = apply_filter(&data, &criteria);

        assert!(view.records().iter().all(|r| criteria.matches(r)));
        let excluded = data.iter().filter(|r| !criteria.matches(r)).count();
        assert_eq!(view.len() + excluded, data.len());
    }

    #[test]
    fn test_empty_selection_gives_empty_view() {
        let criteria = FilterCriteria::new(Vec::<MemberType>::new(), 0..=200, 0..=100);
        assert!(apply_filter(&dataset(), &criteria).is_empty());
    }

    #[test]
    fn test_reversed_range_matches_nothing() {
        let mut criteria = FilterCriteria::all(&dataset());
        criteria.age = 60..=18;
        assert!(apply_filter(&dataset(), &criteria).is_empty());
    }

    #[test]
    fn test_all_criteria_round_trip() {
        let data = dataset();
        let view = apply_filter(&data, &FilterCriteria::all(&data));
        assert_eq!(view.records(), data.records());
    }

    #[test]
    fn test_labels_normalized() {
        let criteria = FilterCriteria::from_labels(["  gOLD ", "non member", ""], 0..=1, 0..=1);
        let labels: Vec<&str> = criteria.types.iter().map(|t| t.as_str()).collect();
        assert_eq!(labels, vec!["Gold"]);
    }
}
