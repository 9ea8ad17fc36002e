//! Turn a raw CSV table into the normalized [`Dataset`].
//!
//! ```text
//! raw rows ──▶ Type: trim + lowercase ──▶ drop non-members ──▶ title-case
//!          ──▶ coerce numeric fields  ──▶ drop invalid rows ──▶ Dataset
//! ```

use std::path::Path;

use crate::config::{AGE_COLUMN, REQUIRED_COLUMNS, TYPE_COLUMN, YEAR_COLUMN};
use crate::error::{SourceError, SourceResult};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::{CustomerRecord, Dataset, LoadStats, Metric};
use crate::parser::{parse_csv_file_auto, ParseResult, RawRow};
use crate::validation::{validate_fields, RawFields};

/// Positions of the required columns in a parsed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    member_type: usize,
    age: usize,
    year: usize,
    movies_watched: usize,
    snacks_popcorn: usize,
    total: usize,
}

impl ColumnLayout {
    /// Locate every required column, reporting all that are missing at once.
    pub fn resolve(parsed: &ParseResult) -> SourceResult<Self> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| parsed.column_index(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SourceError::MissingColumns(missing));
        }

        let index = |name: &str| parsed.column_index(name).unwrap_or_default();
        Ok(Self {
            member_type: index(TYPE_COLUMN),
            age: index(AGE_COLUMN),
            year: index(YEAR_COLUMN),
            movies_watched: index(Metric::MoviesWatched.column()),
            snacks_popcorn: index(Metric::SnacksPopcorn.column()),
            total: index(Metric::TotalSpending.column()),
        })
    }

    fn fields<'a>(&self, row: &'a RawRow) -> RawFields<'a> {
        RawFields {
            member_type: row.get(self.member_type),
            age: row.get(self.age),
            year: row.get(self.year),
            movies_watched: row.get(self.movies_watched),
            snacks_popcorn: row.get(self.snacks_popcorn),
            total: row.get(self.total),
        }
    }
}

/// Normalize a parsed table.
///
/// Fails only when required columns are missing. Rows that do not validate
/// are dropped and counted in the dataset's [`LoadStats`].
pub fn normalize_table(parsed: &ParseResult) -> SourceResult<Dataset> {
    let layout = ColumnLayout::resolve(parsed)?;

    let mut stats = LoadStats {
        total_rows: parsed.rows.len(),
        ..LoadStats::default()
    };
    let mut records = Vec::with_capacity(parsed.rows.len());

    for row in &parsed.rows {
        match validate_fields(layout.fields(row)) {
            Ok(record) => records.push(record),
            Err(issue) if issue.is_non_member() => stats.non_member_rows += 1,
            Err(issue) => {
                log::debug!("dropping line {}: {}", row.line, issue);
                stats.invalid_rows += 1;
            }
        }
    }
    stats.loaded_rows = records.len();

    Ok(Dataset::new(records, stats))
}

/// Re-apply normalization to records that are already normalized.
///
/// Used to check that normalization is a fixed point; the output equals the
/// input for any dataset produced by [`normalize_table`].
pub fn normalize_dataset(dataset: &Dataset) -> Dataset {
    let records: Vec<CustomerRecord> = dataset
        .iter()
        .filter_map(|r| {
            let age = r.age.to_string();
            let year = r.year.to_string();
            let movies = r.movies_watched.to_string();
            let snacks = r.snacks_popcorn.to_string();
            let total = r.total.to_string();
            validate_fields(RawFields {
                member_type: r.member_type.as_str(),
                age: &age,
                year: &year,
                movies_watched: &movies,
                snacks_popcorn: &snacks,
                total: &total,
            })
            .ok()
        })
        .collect();

    let dropped = dataset.len() - records.len();
    let stats = LoadStats {
        invalid_rows: dataset.stats().invalid_rows + dropped,
        loaded_rows: records.len(),
        ..*dataset.stats()
    };
    Dataset::new(records, stats)
}

/// Read, parse and normalize a customer CSV.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> SourceResult<Dataset> {
    let path = path.as_ref();
    log_info(format!("Reading {}...", path.display()));

    let parsed = parse_csv_file_auto(path)?;
    log_success(format!(
        "Read {} rows (encoding {}, separator '{}')",
        parsed.rows.len(),
        parsed.encoding,
        format_delimiter(parsed.delimiter)
    ));

    log_info(format!("CSV has {} columns:", parsed.headers.len()));
    for (i, col) in parsed.headers.iter().enumerate() {
        log_info_indent(format!("[{:2}] {}", i + 1, col), 1);
    }

    let dataset = normalize_table(&parsed)?;
    let stats = dataset.stats();
    if stats.non_member_rows > 0 {
        log_info(format!("Excluded {} non-member rows", stats.non_member_rows));
    }
    if stats.invalid_rows > 0 {
        log_warning(format!("Dropped {} rows with missing or invalid fields", stats.invalid_rows));
    }
    log_success(format!("{} customer records loaded", stats.loaded_rows));

    Ok(dataset)
}

/// Format delimiter for display
fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}
