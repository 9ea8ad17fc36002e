//! Metric cards and key figures.
//!
//! Daily mode shows the plain sum of each metric with its per-row series.
//! Cumulative mode shows the last running total with the running-total
//! series. Both agree on the value; only the chart differs.

use serde::{Deserialize, Serialize};

use crate::models::{DisplayMode, Metric};
use crate::transform::cumulative::{CumulativeView, IndexedView, SeriesPoint};
use crate::transform::filter::FilteredView;

/// One metric card: headline value plus its chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricCard {
    pub metric: Metric,
    pub title: String,
    pub value: f64,
    /// `value` with grouping separators
    pub display: String,
    pub series: Vec<SeriesPoint>,
}

/// The three metric cards for one display mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsPanel {
    pub mode: DisplayMode,
    pub cards: Vec<MetricCard>,
}

impl MetricsPanel {
    pub fn card(&self, metric: Metric) -> Option<&MetricCard> {
        self.cards.iter().find(|c| c.metric == metric)
    }
}

/// Build the metric cards for `view`.
///
/// An empty view gives zero values and empty series.
pub fn summarize_metrics(view: &FilteredView, mode: DisplayMode) -> MetricsPanel {
    let cards = match mode {
        DisplayMode::Daily => {
            let indexed = IndexedView::new(view);
            Metric::ALL
                .into_iter()
                .map(|metric| card(metric, indexed.sum(metric), indexed.series(metric)))
                .collect()
        }
        DisplayMode::Cumulative => {
            let cumulative = CumulativeView::new(view);
            Metric::ALL
                .into_iter()
                .map(|metric| card(metric, cumulative.last(metric), cumulative.series(metric)))
                .collect()
        }
    };
    MetricsPanel { mode, cards }
}

fn card(metric: Metric, value: f64, series: Vec<SeriesPoint>) -> MetricCard {
    MetricCard {
        metric,
        title: metric.title().to_string(),
        value,
        display: format_with_commas(value),
        series,
    }
}

// =============================================================================
// Key figures
// =============================================================================

/// Headline KPIs for the filtered customers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyFigures {
    pub customers: usize,
    /// Mean `Movie_watched_month`, absent for an empty view
    pub avg_monthly_movies: Option<f64>,
    /// Mean `Total`, absent for an empty view
    pub avg_total_spending: Option<f64>,
}

impl KeyFigures {
    pub fn from_view(view: &FilteredView) -> Self {
        Self {
            customers: view.len(),
            avg_monthly_movies: mean(&view.column(Metric::MoviesWatched)),
            avg_total_spending: mean(&view.column(Metric::TotalSpending)),
        }
    }

    /// e.g. `4.25`, or `n/a`
    pub fn display_avg_monthly_movies(&self) -> String {
        self.avg_monthly_movies
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "n/a".to_string())
    }

    /// e.g. `$1,235`, or `n/a`. Halves round to even (`2.5` shows `$2`).
    pub fn display_avg_total_spending(&self) -> String {
        self.avg_total_spending
            .map(|v| format!("${}", format_with_commas(round_half_even(v))))
            .unwrap_or_else(|| "n/a".to_string())
    }
}

/// Arithmetic mean, `None` for no values.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

// =============================================================================
// Formatting
// =============================================================================

/// Round to the nearest integer, ties to the even neighbour.
fn round_half_even(value: f64) -> f64 {
    if (value - value.trunc()).abs() == 0.5 {
        2.0 * (value / 2.0).round()
    } else {
        value.round()
    }
}

/// Format a number with `,` thousands separators.
///
/// Whole numbers print without decimals; other values keep up to two
/// decimals with trailing zeros removed.
///
/// ```
/// use cinema_dashboard::transform::aggregate::format_with_commas;
///
/// assert_eq!(format_with_commas(1234567.0), "1,234,567");
/// assert_eq!(format_with_commas(1234.5), "1,234.5");
/// assert_eq!(format_with_commas(-980.126), "-980.13");
/// ```
pub fn format_with_commas(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = format!("{:.2}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}
