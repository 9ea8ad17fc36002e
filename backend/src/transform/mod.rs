//! Transformation module.
//!
//! - Normalize: raw CSV table to the normalized dataset
//! - Filter: sidebar predicates
//! - Cumulative: synthetic date index and running totals
//! - Aggregate: metric cards and key figures
//! - Compare: scatter with regression, or mean Total per type
//! - Pipeline: one recompute pass over all of the above

pub mod aggregate;
pub mod compare;
pub mod cumulative;
pub mod filter;
pub mod normalize;
pub mod pipeline;

pub use aggregate::{format_with_commas, summarize_metrics, KeyFigures, MetricCard, MetricsPanel};
pub use compare::{compare, fit_line, Comparison, GroupMean, RegressionLine, ScatterData, ScatterPoint};
pub use cumulative::{CumulativeView, IndexedRow, IndexedView, SeriesPoint};
pub use filter::{apply_filter, FilterCriteria, FilteredView};
pub use normalize::{load_dataset, normalize_dataset, normalize_table};
pub use pipeline::*;
