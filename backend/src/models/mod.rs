//! Domain models for the cinema dashboard pipeline.
//!
//! - [`MemberType`] - normalized membership tier (Gold, Silver, ...)
//! - [`CustomerRecord`] - one validated row of the source table
//! - [`Metric`] - the three tracked spending/usage metrics
//! - [`DisplayMode`] - instantaneous or cumulative display
//! - [`ComparisonVariable`] - what Total is compared against
//! - [`Dataset`] - the immutable normalized table

mod dataset;

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{AGE_COLUMN, TYPE_COLUMN, YEAR_COLUMN};
use crate::error::InvalidMemberType;

pub use dataset::{Dataset, LoadStats};

// =============================================================================
// Member Type
// =============================================================================

/// Matches "nonmember", "non member", "non-member", "non_member" and the like
/// on lower-cased input.
static NON_MEMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"non.?member").expect("valid non-member pattern"));

/// Membership tier of a customer, title-cased.
///
/// Non-members never make it into a `MemberType`, including through
/// deserialization, which normalizes like [`MemberType::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberType(String);

impl MemberType {
    /// Normalize a raw `Type` value.
    ///
    /// Trims and lower-cases the input, rejects empty values and anything
    /// matching the non-member pattern, then title-cases the rest.
    pub fn parse(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_lowercase();
        if lowered.is_empty() || NON_MEMBER.is_match(&lowered) {
            return None;
        }
        Some(Self(title_case(&lowered)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MemberType {
    type Error = InvalidMemberType;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw).ok_or(InvalidMemberType(raw))
    }
}

impl From<MemberType> for String {
    fn from(member_type: MemberType) -> Self {
        member_type.0
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
///
/// Only the first char of a multi-char upper-case mapping stays upper-case
/// (`ß` becomes `Ss`), so title-casing a title-cased value is a no-op.
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for c in value.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                let mut upper = c.to_uppercase();
                out.extend(upper.next());
                out.extend(upper.flat_map(char::to_lowercase));
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

// =============================================================================
// Customer Record
// =============================================================================

/// One validated customer row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(rename = "Type")]
    pub member_type: MemberType,
    #[serde(rename = "Age")]
    pub age: i64,
    /// Membership tenure in years.
    #[serde(rename = "Year")]
    pub year: i64,
    #[serde(rename = "Movie_watched_month")]
    pub movies_watched: f64,
    #[serde(rename = "Snacks_popcorn")]
    pub snacks_popcorn: f64,
    /// Total spending.
    #[serde(rename = "Total")]
    pub total: f64,
}

impl CustomerRecord {
    /// Value of one of the tracked metrics.
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::MoviesWatched => self.movies_watched,
            Metric::SnacksPopcorn => self.snacks_popcorn,
            Metric::TotalSpending => self.total,
        }
    }

    pub(crate) fn metric_mut(&mut self, metric: Metric) -> &mut f64 {
        match metric {
            Metric::MoviesWatched => &mut self.movies_watched,
            Metric::SnacksPopcorn => &mut self.snacks_popcorn,
            Metric::TotalSpending => &mut self.total,
        }
    }
}

// =============================================================================
// Metric
// =============================================================================

/// The numeric metrics shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// `Movie_watched_month`
    MoviesWatched,
    /// `Snacks_popcorn`
    SnacksPopcorn,
    /// `Total`
    TotalSpending,
}

impl Metric {
    pub const ALL: [Metric; 3] = [
        Metric::MoviesWatched,
        Metric::SnacksPopcorn,
        Metric::TotalSpending,
    ];

    /// Source column name.
    pub fn column(&self) -> &'static str {
        match self {
            Self::MoviesWatched => "Movie_watched_month",
            Self::SnacksPopcorn => "Snacks_popcorn",
            Self::TotalSpending => "Total",
        }
    }

    /// Title of the metric card.
    pub fn title(&self) -> &'static str {
        match self {
            Self::MoviesWatched => "Monthly Movies",
            Self::SnacksPopcorn => "Snacks Purchased",
            Self::TotalSpending => "Total Spending ($)",
        }
    }

    pub fn from_column(column: &str) -> Option<Self> {
        let column = column.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.column().eq_ignore_ascii_case(column))
    }
}

// =============================================================================
// Display Mode
// =============================================================================

/// How metric cards and their series are shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Per-row values; the card shows the plain sum.
    #[default]
    Daily,
    /// Running totals in load order; the card shows the last running total.
    Cumulative,
}

// =============================================================================
// Comparison Variable
// =============================================================================

/// Variable plotted against `Total` in the comparison chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "metric")]
pub enum ComparisonVariable {
    Metric(Metric),
    #[default]
    Age,
    Year,
    /// Categorical: mean `Total` per member type.
    Type,
}

impl ComparisonVariable {
    /// Parse from a source column name, case-insensitively.
    pub fn from_column(column: &str) -> Option<Self> {
        let trimmed = column.trim();
        if trimmed.eq_ignore_ascii_case(AGE_COLUMN) {
            Some(Self::Age)
        } else if trimmed.eq_ignore_ascii_case(YEAR_COLUMN) {
            Some(Self::Year)
        } else if trimmed.eq_ignore_ascii_case(TYPE_COLUMN) {
            Some(Self::Type)
        } else {
            Metric::from_column(trimmed).map(Self::Metric)
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Metric(m) => m.column(),
            Self::Age => AGE_COLUMN,
            Self::Year => YEAR_COLUMN,
            Self::Type => TYPE_COLUMN,
        }
    }

    /// Numeric value of this variable for a record, `None` for `Type`.
    pub fn numeric_value(&self, record: &CustomerRecord) -> Option<f64> {
        match self {
            Self::Metric(m) => Some(record.metric(*m)),
            Self::Age => Some(record.age as f64),
            Self::Year => Some(record.year as f64),
            Self::Type => None,
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, Self::Type)
    }
}
