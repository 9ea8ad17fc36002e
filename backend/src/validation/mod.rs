//! Field coercion and per-row validation.
//!
//! Coercion treats anything that is not a finite decimal number as missing.
//! A row with a missing required field is rejected with a [`RowIssue`]; the
//! caller drops it and only counts the drop.

use std::fmt;

use crate::config::{AGE_COLUMN, TYPE_COLUMN, YEAR_COLUMN};
use crate::models::{CustomerRecord, MemberType, Metric};

/// Why a row was not loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum RowIssue {
    /// Type is a non-member; excluded by design.
    NonMember { value: String },
    /// Type is empty.
    MissingType,
    /// A required numeric field is empty or not a number.
    NotNumeric { column: &'static str, value: String },
}

impl RowIssue {
    pub fn is_non_member(&self) -> bool {
        matches!(self, RowIssue::NonMember { .. })
    }
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowIssue::NonMember { value } => write!(f, "non-member type '{}'", value),
            RowIssue::MissingType => write!(f, "missing {}", TYPE_COLUMN),
            RowIssue::NotNumeric { column, value } => {
                write!(f, "column '{}' is not numeric (value '{}')", column, value)
            }
        }
    }
}

/// Raw text of the required fields of one row.
#[derive(Debug, Clone, Copy)]
pub struct RawFields<'a> {
    pub member_type: &'a str,
    pub age: &'a str,
    pub year: &'a str,
    pub movies_watched: &'a str,
    pub snacks_popcorn: &'a str,
    pub total: &'a str,
}

/// Coerce a value to a finite number, `None` when missing or invalid.
pub fn coerce_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce a value to a whole number; `30` and `30.0` are both accepted.
pub fn coerce_whole_number(raw: &str) -> Option<i64> {
    let value = coerce_number(raw)?;
    if value.fract() != 0.0 || value.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(value as i64)
}

/// Classify a raw `Type` value.
pub fn validate_member_type(raw: &str) -> Result<MemberType, RowIssue> {
    if raw.trim().is_empty() {
        return Err(RowIssue::MissingType);
    }
    MemberType::parse(raw).ok_or_else(|| RowIssue::NonMember {
        value: raw.trim().to_string(),
    })
}

/// Validate and coerce one row into a [`CustomerRecord`].
///
/// The type is checked first, so a non-member row with bad numbers is still
/// reported as a non-member.
pub fn validate_fields(fields: RawFields<'_>) -> Result<CustomerRecord, RowIssue> {
    let member_type = validate_member_type(fields.member_type)?;

    let whole = |column: &'static str, raw: &str| {
        coerce_whole_number(raw).ok_or_else(|| RowIssue::NotNumeric {
            column,
            value: raw.to_string(),
        })
    };
    let number = |metric: Metric, raw: &str| {
        coerce_number(raw).ok_or_else(|| RowIssue::NotNumeric {
            column: metric.column(),
            value: raw.to_string(),
        })
    };

    Ok(CustomerRecord {
        member_type,
        age: whole(AGE_COLUMN, fields.age)?,
        year: whole(YEAR_COLUMN, fields.year)?,
        movies_watched: number(Metric::MoviesWatched, fields.movies_watched)?,
        snacks_popcorn: number(Metric::SnacksPopcorn, fields.snacks_popcorn)?,
        total: number(Metric::TotalSpending, fields.total)?,
    })
}
