//! Comparison of `Total` spending against another variable.
//!
//! Numeric variables give a scatter of `(x, Total)` with an ordinary least
//! squares line. `Type` gives the mean `Total` per member type, highest
//! first. An empty view gives [`Comparison::NoData`] in both cases.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{ComparisonVariable, MemberType};
use crate::transform::filter::FilteredView;

/// One `(x, y)` sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

/// Fitted line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionLine {
    pub intercept: f64,
    pub slope: f64,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Smallest and largest x the line was fitted on
    pub x_min: f64,
    pub x_max: f64,
}

impl RegressionLine {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// End points of the line over the fitted x range, for drawing.
    pub fn endpoints(&self) -> [ScatterPoint; 2] {
        [
            ScatterPoint { x: self.x_min, y: self.predict(self.x_min) },
            ScatterPoint { x: self.x_max, y: self.predict(self.x_max) },
        ]
    }
}

/// Fit an ordinary least squares line through `samples`.
///
/// Returns `None` when the line is undetermined: no samples, or every x equal
/// (which includes a single sample). Any spread in x fits, whatever its scale.
pub fn fit_line(samples: &[ScatterPoint]) -> Option<RegressionLine> {
    let (x_min, x_max) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
    if samples.is_empty() || x_min == x_max {
        return None;
    }

    let n = samples.len() as f64;
    let mean_x = samples.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = samples.iter().map(|p| p.y).sum::<f64>() / n;

    let (sxx, sxy) = samples.iter().fold((0.0, 0.0), |(sxx, sxy), p| {
        let dx = p.x - mean_x;
        (sxx + dx * dx, sxy + dx * (p.y - mean_y))
    });
    // Only reachable through underflow of tiny deviations.
    if sxx <= 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let ss_tot: f64 = samples.iter().map(|p| (p.y - mean_y).powi(2)).sum();
    let ss_res: f64 = samples
        .iter()
        .map(|p| (p.y - (intercept + slope * p.x)).powi(2))
        .sum();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };

    Some(RegressionLine { intercept, slope, r_squared, x_min, x_max })
}

/// Scatter of a numeric variable against `Total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterData {
    pub variable: ComparisonVariable,
    pub points: Vec<ScatterPoint>,
    /// `None` when the samples do not determine a line
    pub regression: Option<RegressionLine>,
}

/// Mean `Total` for one member type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMean {
    pub member_type: MemberType,
    pub mean_total: f64,
    pub customers: usize,
}

/// Result of comparing `Total` against a variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Comparison {
    Scatter(ScatterData),
    Grouped { groups: Vec<GroupMean> },
    /// The filtered view is empty; nothing to plot.
    NoData { variable: ComparisonVariable },
}

impl Comparison {
    pub fn is_no_data(&self) -> bool {
        matches!(self, Comparison::NoData { .. })
    }
}

/// Compare `Total` against `variable` over `view`.
pub fn compare(view: &FilteredView, variable: ComparisonVariable) -> Comparison {
    if view.is_empty() {
        return Comparison::NoData { variable };
    }
    if variable.is_categorical() {
        Comparison::Grouped { groups: group_means(view) }
    } else {
        Comparison::Scatter(scatter(view, variable))
    }
}

fn scatter(view: &FilteredView, variable: ComparisonVariable) -> ScatterData {
    let points: Vec<ScatterPoint> = view
        .records()
        .iter()
        .filter_map(|r| {
            variable
                .numeric_value(r)
                .map(|x| ScatterPoint { x, y: r.total })
        })
        .collect();
    let regression = fit_line(&points);
    ScatterData { variable, points, regression }
}

/// Mean `Total` per member type, sorted by mean descending then by name.
pub fn group_means(view: &FilteredView) -> Vec<GroupMean> {
    let mut sums: BTreeMap<&MemberType, (f64, usize)> = BTreeMap::new();
    for record in view.records() {
        let entry = sums.entry(&record.member_type).or_insert((0.0, 0));
        entry.0 += record.total;
        entry.1 += 1;
    }

    let mut groups: Vec<GroupMean> = sums
        .into_iter()
        .map(|(member_type, (sum, count))| GroupMean {
            member_type: member_type.clone(),
            mean_total: sum / count as f64,
            customers: count,
        })
        .collect();

    // BTreeMap order is by name, so a stable sort keeps ties alphabetical.
    groups.sort_by(|a, b| {
        b.mean_total
            .partial_cmp(&a.mean_total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerRecord, Metric};

    fn record(member_type: &str, age: i64, total: f64) -> CustomerRecord {
        CustomerRecord {
            member_type: MemberType::parse(member_type).unwrap(),
            age,
            year: 2,
            movies_watched: 3.0,
            snacks_popcorn: 1.0,
            total,
        }
    }

    fn points(pairs: &[(f64, f64)]) -> Vec<ScatterPoint> {
        pairs.iter().map(|&(x, y)| ScatterPoint { x, y }).collect()
    }

    #[test]
    fn test_fit_exact_line() {
        let line = fit_line(&points(&[(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)])).unwrap();
        assert!((line.slope - 2.0).abs() < 1e-10);
        assert!(line.intercept.abs() < 1e-10);
        assert!((line.r_squared - 1.0).abs() < 1e-10);
        assert_eq!(line.endpoints()[1], ScatterPoint { x: 3.0, y: 6.0 });
    }

    #[test]
    fn test_fit_noisy_line() {
        let line = fit_line(&points(&[(0.0, 1.5), (2.0, 1.5), (4.0, 3.5), (6.0, 3.5)])).unwrap();
        assert!((line.slope - 0.4).abs() < 1e-10);
        assert!((line.intercept - 1.3).abs() < 1e-10);
        assert!(line.r_squared > 0.0 && line.r_squared < 1.0);
    }

    #[test]
    fn test_fit_small_and_offset_x() {
        let line = fit_line(&points(&[(1e-9, 1.0), (2e-9, 2.0), (3e-9, 3.0)])).unwrap();
        assert!((line.slope / 1e9 - 1.0).abs() < 1e-6);
        assert!(line.intercept.abs() < 1e-6);

        let line = fit_line(&points(&[(1e8, 10.0), (1e8 + 1.0, 12.0)])).unwrap();
        assert!((line.slope - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_undetermined() {
        assert!(fit_line(&[]).is_none());
        assert!(fit_line(&points(&[(5.0, 1.0)])).is_none());
        assert!(fit_line(&points(&[(5.0, 1.0), (5.0, 9.0)])).is_none());
        assert!(fit_line(&points(&[(1e-9, 1.0), (1e-9, 9.0)])).is_none());
    }

    #[test]
    fn test_scatter_by_age() {
        let view = FilteredView::from_records(vec![
            record("Gold", 20, 40.0),
            record("Silver", 30, 60.0),
            record("Gold", 40, 80.0),
        ]);
        match compare(&view, ComparisonVariable::Age) {
            Comparison::Scatter(data) => {
                assert_eq!(data.points.len(), 3);
                assert_eq!(data.points[0], ScatterPoint { x: 20.0, y: 40.0 });
                let line = data.regression.unwrap();
                assert!((line.slope - 2.0).abs() < 1e-10);
            }
            other => panic!("expected scatter, got {other:?}"),
        }
    }

    #[test]
    fn test_single_row_scatter_has_no_line() {
        let view = FilteredView::from_records(vec![record("Gold", 20, 40.0)]);
        match compare(&view, ComparisonVariable::Metric(Metric::SnacksPopcorn)) {
            Comparison::Scatter(data) => {
                assert_eq!(data.points.len(), 1);
                assert!(data.regression.is_none());
            }
            other => panic!("expected scatter, got {other:?}"),
        }
    }

    #[test]
    fn test_grouped_means_sorted_descending() {
        let view = FilteredView::from_records(vec![
            record("Silver", 30, 20.0),
            record("Gold", 30, 100.0),
            record("Gold", 30, 50.0),
            record("Bronze", 30, 20.0),
        ]);
        match compare(&view, ComparisonVariable::Type) {
            Comparison::Grouped { groups } => {
                let order: Vec<(&str, f64)> = groups
                    .iter()
                    .map(|g| (g.member_type.as_str(), g.mean_total))
                    .collect();
                assert_eq!(order, vec![("Gold", 75.0), ("Bronze", 20.0), ("Silver", 20.0)]);
                assert_eq!(groups[0].customers, 2);
            }
            other => panic!("expected grouped, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_view_is_no_data() {
        let view = FilteredView::default();
        assert!(compare(&view, ComparisonVariable::Type).is_no_data());
        assert!(compare(&view, ComparisonVariable::Year).is_no_data());
    }

    #[test]
    fn test_comparison_serializes_with_kind() {
        let json = serde_json::to_value(compare(&FilteredView::default(), ComparisonVariable::Type)).unwrap();
        assert_eq!(json["kind"], "noData");
    }
}
