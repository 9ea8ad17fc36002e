//! Synthetic date index and running totals.
//!
//! The source has no timestamps. Rows are dated one day apart in load order,
//! starting at [`SERIES_START_DATE`], purely so metrics can be charted on a
//! date axis. "Cumulative" therefore means cumulative in load order.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::SERIES_START_DATE;
use crate::models::{CustomerRecord, Metric};
use crate::transform::filter::FilteredView;

/// One chart point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A record with its synthetic date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedRow {
    #[serde(rename = "DATE")]
    pub date: NaiveDate,
    #[serde(flatten)]
    pub record: CustomerRecord,
}

/// Date of the `position`-th row.
pub fn synthetic_date(position: usize) -> NaiveDate {
    SERIES_START_DATE
        .checked_add_days(Days::new(position as u64))
        .unwrap_or(NaiveDate::MAX)
}

fn index_rows(records: &[CustomerRecord]) -> Vec<IndexedRow> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| IndexedRow {
            date: synthetic_date(i),
            record: record.clone(),
        })
        .collect()
}

fn series_of(rows: &[IndexedRow], metric: Metric) -> Vec<SeriesPoint> {
    rows.iter()
        .map(|row| SeriesPoint {
            date: row.date,
            value: row.record.metric(metric),
        })
        .collect()
}

/// A filtered view with per-row values and synthetic dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexedView {
    rows: Vec<IndexedRow>,
}

impl IndexedView {
    pub fn new(view: &FilteredView) -> Self {
        Self { rows: index_rows(view.records()) }
    }

    pub fn rows(&self) -> &[IndexedRow] {
        &self.rows
    }

    pub fn series(&self, metric: Metric) -> Vec<SeriesPoint> {
        series_of(&self.rows, metric)
    }

    pub fn sum(&self, metric: Metric) -> f64 {
        self.rows.iter().map(|row| row.record.metric(metric)).sum()
    }
}

/// A filtered view whose metrics are running totals in load order.
///
/// The last value of each metric equals the plain sum over the view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CumulativeView {
    rows: Vec<IndexedRow>,
}

impl CumulativeView {
    pub fn new(view: &FilteredView) -> Self {
        let mut rows = index_rows(view.records());
        let mut running = [0.0_f64; 3];
        for row in &mut rows {
            for (total, metric) in running.iter_mut().zip(Metric::ALL) {
                let value = row.record.metric_mut(metric);
                *total += *value;
                *value = *total;
            }
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[IndexedRow] {
        &self.rows
    }

    pub fn series(&self, metric: Metric) -> Vec<SeriesPoint> {
        series_of(&self.rows, metric)
    }

    /// Final running total, zero for an empty view.
    pub fn last(&self, metric: Metric) -> f64 {
        self.rows
            .last()
            .map(|row| row.record.metric(metric))
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberType;

    fn view(totals: &[f64]) -> FilteredView {
        FilteredView::from_records(
            totals
                .iter()
                .enumerate()
                .map(|(i, &total)| CustomerRecord {
                    member_type: MemberType::parse("gold").unwrap(),
                    age: 30,
                    year: 2,
                    movies_watched: i as f64 + 1.0,
                    snacks_popcorn: 0.5,
                    total,
                })
                .collect(),
        )
    }

    #[test]
    fn test_running_totals() {
        let cumulative = CumulativeView::new(&view(&[10.0, 5.0, 2.5]));
        let totals: Vec<f64> = cumulative
            .series(Metric::TotalSpending)
            .iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(totals, vec![10.0, 15.0, 17.5]);

        let movies: Vec<f64> = cumulative
            .series(Metric::MoviesWatched)
            .iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(movies, vec![1.0, 3.0, 6.0]);
    }

    #[test]
    fn test_last_equals_sum() {
        let filtered = view(&[12.25, 7.0, 30.5, 0.25]);
        let indexed = IndexedView::new(&filtered);
        let cumulative = CumulativeView::new(&filtered);

        for metric in Metric::ALL {
            assert!((cumulative.last(metric) - indexed.sum(metric)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_view_is_zero() {
        let filtered = view(&[]);
        let cumulative = CumulativeView::new(&filtered);

        for metric in Metric::ALL {
            assert_eq!(cumulative.last(metric), 0.0);
            assert_eq!(IndexedView::new(&filtered).sum(metric), 0.0);
        }
        assert!(cumulative.series(Metric::TotalSpending).is_empty());
    }

    #[test]
    fn test_dates_are_daily_from_start() {
        let indexed = IndexedView::new(&view(&[1.0, 2.0, 3.0]));
        let dates: Vec<String> = indexed.rows().iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2023-01-01", "2023-01-02", "2023-01-03"]);
    }

    #[test]
    fn test_cumulative_leaves_source_untouched() {
        let filtered = view(&[4.0, 6.0]);
        let _ = CumulativeView::new(&filtered);
        assert_eq!(filtered.column(Metric::TotalSpending), vec![4.0, 6.0]);
    }
}
