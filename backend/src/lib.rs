//! # Cinema Dashboard - data pipeline for the cinema customer dashboard
//!
//! Loads a CSV of cinema customer records, cleans it, and computes what the
//! dashboard shows for the current sidebar selection.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Normalize  │────▶│   Dataset   │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (drop rows) │     │  (cached)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                     │
//!              ┌──────────────────────────────────────────────────────┘
//!              ▼
//!       ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//!       │   Filter    │────▶│  Aggregate  │────▶│  Snapshot   │
//!       │ type/age/yr │     │  + Compare  │     │   (JSON)    │
//!       └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cinema_dashboard::{DashboardConfig, DashboardPipeline};
//!
//! let mut pipeline = DashboardPipeline::new();
//! let dataset = pipeline.dataset("cinema_customers_expanded.csv").unwrap();
//! let snapshot = pipeline
//!     .refresh("cinema_customers_expanded.csv", &DashboardConfig::for_dataset(&dataset))
//!     .unwrap();
//! println!("{} customers selected", snapshot.view.len());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`config`] - Fixed settings and column names
//! - [`logs`] - Pipeline log entries
//! - [`models`] - Domain models (MemberType, CustomerRecord, Dataset)
//! - [`parser`] - CSV parsing with auto-detection
//! - [`validation`] - Numeric coercion and row validation
//! - [`cache`] - Dataset memoization
//! - [`transform`] - Normalize, filter, aggregate, compare, pipeline

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Parsing
pub mod parser;

// Validation
pub mod validation;

// Caching
pub mod cache;

// Transformation
pub mod transform;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{InvalidMemberType, PipelineError, PipelineResult, SourceError, SourceResult};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    ComparisonVariable,
    CustomerRecord,
    Dataset,
    DisplayMode,
    LoadStats,
    MemberType,
    Metric,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    parse_bytes_auto,
    parse_csv_file_auto,
    parse_str,
    CsvError,
    ParseResult,
    RawRow,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{coerce_number, coerce_whole_number, validate_fields, RawFields, RowIssue};

// =============================================================================
// Re-exports - Cache
// =============================================================================

pub use cache::{CacheStats, DatasetCache, SourceIdentity};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    apply_filter,
    compare,
    compute_snapshot,
    fit_line,
    format_with_commas,
    load_dataset,
    normalize_dataset,
    normalize_table,
    summarize_metrics,
    Comparison,
    CumulativeView,
    DashboardConfig,
    DashboardPipeline,
    DashboardSnapshot,
    FilterCriteria,
    FilteredView,
    GroupMean,
    IndexedView,
    KeyFigures,
    MetricCard,
    MetricsPanel,
    RegressionLine,
    ScatterData,
    ScatterPoint,
    SeriesPoint,
};

// =============================================================================
// Re-exports - Logs
// =============================================================================

pub use logs::{recent_logs, LogEntry, LogLevel};
