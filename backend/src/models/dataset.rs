use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::slice;

use serde::{Deserialize, Serialize};

use super::{CustomerRecord, MemberType};

/// How the rows of a source were classified during normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadStats {
    /// Data rows read from the source.
    pub total_rows: usize,
    /// Rows excluded because their type is a non-member.
    pub non_member_rows: usize,
    /// Rows dropped because a required field was missing or not numeric.
    pub invalid_rows: usize,
    /// Rows kept in the dataset.
    pub loaded_rows: usize,
}

/// The normalized customer table.
///
/// Built once per source and never mutated; filters and transforms produce
/// derived copies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<CustomerRecord>,
    stats: LoadStats,
}

impl Dataset {
    pub fn new(records: Vec<CustomerRecord>, stats: LoadStats) -> Self {
        Self { records, stats }
    }

    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    pub fn iter(&self) -> slice::Iter<'_, CustomerRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    /// Distinct member types, sorted.
    pub fn member_types(&self) -> BTreeSet<MemberType> {
        self.records.iter().map(|r| r.member_type.clone()).collect()
    }

    /// Observed `[min, max]` age, `None` when empty.
    pub fn age_bounds(&self) -> Option<RangeInclusive<i64>> {
        bounds(self.records.iter().map(|r| r.age))
    }

    /// Observed `[min, max]` tenure year, `None` when empty.
    pub fn year_bounds(&self) -> Option<RangeInclusive<i64>> {
        bounds(self.records.iter().map(|r| r.year))
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a CustomerRecord;
    type IntoIter = slice::Iter<'a, CustomerRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn bounds(values: impl Iterator<Item = i64>) -> Option<RangeInclusive<i64>> {
    values.fold(None, |acc, v| match acc {
        None => Some(v..=v),
        Some(range) => Some(*range.start().min(&v)..=*range.end().max(&v)),
    })
}
