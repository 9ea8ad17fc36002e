//! Pipeline configuration constants.
//!
//! Runtime choices made by the user (filters, display mode, comparison
//! variable) live in [`crate::transform::pipeline::DashboardConfig`]; the
//! values here are fixed for the whole session.

use chrono::NaiveDate;

/// Source file the dashboard reads when none is given.
pub const DEFAULT_SOURCE_FILE: &str = "cinema_customers_expanded.csv";

/// Column holding the membership tier.
pub const TYPE_COLUMN: &str = "Type";

/// Column holding the customer's age in years.
pub const AGE_COLUMN: &str = "Age";

/// Column holding the membership tenure in years.
pub const YEAR_COLUMN: &str = "Year";

/// Columns that must be present in the header row. Others are ignored.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    TYPE_COLUMN,
    AGE_COLUMN,
    YEAR_COLUMN,
    "Movie_watched_month",
    "Snacks_popcorn",
    "Total",
];

/// First day of the synthetic date index.
///
/// The source has no timestamps; each row in load order is assigned one day
/// starting here so series can be charted over a date axis.
pub const SERIES_START_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2023, 1, 1) {
    Some(date) => date,
    None => panic!("invalid series start date"),
};

/// Maximum log entries kept in memory for the display surface.
pub const MAX_LOG_ENTRIES: usize = 100;
