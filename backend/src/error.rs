//! Error types for the cinema dashboard pipeline.
//!
//! - [`SourceError`] - the source CSV is missing, unreadable or malformed
//! - [`PipelineError`] - top-level errors returned to the display surface
//! - [`InvalidMemberType`] - a `Type` label that is blank or a non-member
//!
//! Rows that fail validation are not errors: they are dropped during
//! normalization and only counted in [`crate::models::LoadStats`]. Filters
//! that match nothing are not errors either.

use std::path::PathBuf;

use thiserror::Error;

use crate::parser::CsvError;

// =============================================================================
// Source Errors
// =============================================================================

/// Errors while reading and decoding the customer CSV.
///
/// Every variant is fatal: nothing is rendered from a source that fails here.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source file does not exist.
    #[error("Source file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The source file exists but could not be read.
    #[error("Failed to read source file: {0}")]
    Io(#[from] std::io::Error),

    /// The content could not be parsed as CSV.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] CsvError),

    /// Required columns are absent from the header row.
    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// A `Type` label that does not normalize to a member type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a member type")]
pub struct InvalidMemberType(pub String);

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// Returned by [`crate::transform::pipeline::DashboardPipeline`]. Computation
/// over an already loaded dataset never fails, so the only failures are at
/// load time.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loading the source failed.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source loading.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
