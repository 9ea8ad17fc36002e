//! One recompute pass of the dashboard.
//!
//! Every dashboard variant is the same pipeline with different settings:
//!
//! ```text
//! Dataset (cached) ──▶ filter ──▶ metric cards (daily | cumulative)
//!                              ├─▶ key figures
//!                              └─▶ comparison (scatter + OLS | group means)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use cinema_dashboard::{DashboardConfig, DashboardPipeline, DisplayMode};
//!
//! // Reads `cinema_customers_expanded.csv` from the working directory.
//! let mut pipeline = DashboardPipeline::new();
//! let dataset = pipeline.load_source()?;
//! let config = DashboardConfig::for_dataset(&dataset).with_display_mode(DisplayMode::Cumulative);
//!
//! let snapshot = pipeline.refresh_source(&config)?;
//! println!("{} customers", snapshot.key_figures.customers);
//! # Ok::<(), cinema_dashboard::PipelineError>(())
//! ```

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::DatasetCache;
use crate::config::DEFAULT_SOURCE_FILE;
use crate::error::PipelineResult;
use crate::logs::{log_error, log_info, log_warning};
use crate::models::{ComparisonVariable, Dataset, DisplayMode, LoadStats, MemberType};
use crate::transform::aggregate::{summarize_metrics, KeyFigures, MetricsPanel};
use crate::transform::compare::{compare, Comparison};
use crate::transform::filter::{apply_filter, FilterCriteria, FilteredView};

/// User-selected settings for one recompute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardConfig {
    pub filter: FilterCriteria,
    #[serde(default)]
    pub display_mode: DisplayMode,
    #[serde(default)]
    pub comparison: ComparisonVariable,
}

impl DashboardConfig {
    /// Sidebar defaults: every type, full observed ranges, daily display,
    /// Total compared against Age.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        Self {
            filter: FilterCriteria::all(dataset),
            display_mode: DisplayMode::default(),
            comparison: ComparisonVariable::default(),
        }
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = MemberType>) -> Self {
        self.filter.types = types.into_iter().collect();
        self
    }

    pub fn with_age_range(mut self, age: RangeInclusive<i64>) -> Self {
        self.filter.age = age;
        self
    }

    pub fn with_year_range(mut self, year: RangeInclusive<i64>) -> Self {
        self.filter.year = year;
        self
    }

    pub fn with_display_mode(mut self, mode: DisplayMode) -> Self {
        self.display_mode = mode;
        self
    }

    pub fn with_comparison(mut self, variable: ComparisonVariable) -> Self {
        self.comparison = variable;
        self
    }
}

/// Everything the display surface needs after one interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub load_stats: LoadStats,
    /// Filtered rows, for the data preview
    pub view: FilteredView,
    pub metrics: MetricsPanel,
    pub key_figures: KeyFigures,
    pub comparison: Comparison,
}

impl DashboardSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Run filter, aggregation and comparison over a loaded dataset.
///
/// Never fails: an empty selection produces zero metrics and a
/// [`Comparison::NoData`].
pub fn compute_snapshot(dataset: &Dataset, config: &DashboardConfig) -> DashboardSnapshot {
    let view = apply_filter(dataset, &config.filter);
    if view.is_empty() {
        log_warning("No customers match the current filters");
    } else {
        log_info(format!("{} of {} customers selected", view.len(), dataset.len()));
    }

    let metrics = summarize_metrics(&view, config.display_mode);
    let key_figures = KeyFigures::from_view(&view);
    let comparison = compare(&view, config.comparison);

    DashboardSnapshot {
        load_stats: *dataset.stats(),
        view,
        metrics,
        key_figures,
        comparison,
    }
}

/// Entry point for the display surface; owns the dataset cache.
///
/// The configured source defaults to [`DEFAULT_SOURCE_FILE`] in the working
/// directory.
#[derive(Debug)]
pub struct DashboardPipeline {
    source: PathBuf,
    cache: DatasetCache,
}

impl Default for DashboardPipeline {
    fn default() -> Self {
        Self::with_cache(DatasetCache::default())
    }
}

impl DashboardPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(cache: DatasetCache) -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE_FILE),
            cache,
        }
    }

    /// Read from `path` instead of the default source file.
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = path.into();
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The normalized dataset for the configured source.
    pub fn load_source(&mut self) -> PipelineResult<Arc<Dataset>> {
        let source = self.source.clone();
        self.dataset(source)
    }

    /// One recompute pass over the configured source.
    pub fn refresh_source(&mut self, config: &DashboardConfig) -> PipelineResult<DashboardSnapshot> {
        let dataset = self.load_source()?;
        Ok(compute_snapshot(&dataset, config))
    }

    /// The normalized dataset for `path`, loaded at most once per version of
    /// the file.
    pub fn dataset(&mut self, path: impl AsRef<Path>) -> PipelineResult<Arc<Dataset>> {
        self.cache.get_or_load(path).map_err(|e| {
            log_error(format!("Cannot load dataset: {}", e));
            e.into()
        })
    }

    /// One recompute pass for a filter change.
    pub fn refresh(
        &mut self,
        path: impl AsRef<Path>,
        config: &DashboardConfig,
    ) -> PipelineResult<DashboardSnapshot> {
        let dataset = self.dataset(path)?;
        Ok(compute_snapshot(&dataset, config))
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut DatasetCache {
        &mut self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PipelineError, SourceError};
    use crate::models::Metric;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Type,Age,Year,Movie_watched_month,Snacks_popcorn,Total").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file
    }

    #[test]
    fn test_sidebar_example() {
        let file = create_test_csv(&[
            "Gold,30,2,4,3,50",
            "Non Member,40,1,2,1,10",
            "Silver,70,6,8,5,90",
        ]);
        let mut pipeline = DashboardPipeline::new();
        let dataset = pipeline.dataset(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);

        let config = DashboardConfig::for_dataset(&dataset)
            .with_types(["Gold", "Silver"].into_iter().filter_map(MemberType::parse))
            .with_age_range(18..=60)
            .with_year_range(1..=5);
        let snapshot = pipeline.refresh(file.path(), &config).unwrap();

        assert_eq!(snapshot.view.len(), 1);
        assert_eq!(snapshot.view.records()[0].member_type.as_str(), "Gold");
        let total = snapshot.metrics.card(Metric::TotalSpending).unwrap();
        assert_eq!(total.value, 50.0);
        assert_eq!(total.display, "50");
        assert_eq!(snapshot.load_stats.non_member_rows, 1);
    }

    #[test]
    fn test_defaults_round_trip_dataset() {
        let file = create_test_csv(&[
            "gold,22,1,3,2,40.5",
            "SILVER,65,8,1,0,12",
            "Bronze,40,4,6,4,88",
        ]);
        let mut pipeline = DashboardPipeline::new();
        let dataset = pipeline.dataset(file.path()).unwrap();

        let snapshot = compute_snapshot(&dataset, &DashboardConfig::for_dataset(&dataset));
        assert_eq!(snapshot.view.records(), dataset.records());
        assert_eq!(snapshot.key_figures.customers, 3);
    }

    #[test]
    fn test_empty_selection_gives_no_data() {
        let file = create_test_csv(&["Gold,30,2,4,3,50"]);
        let mut pipeline = DashboardPipeline::new();
        let dataset = pipeline.dataset(file.path()).unwrap();

        let config = DashboardConfig::for_dataset(&dataset)
            .with_types(Vec::<MemberType>::new())
            .with_display_mode(DisplayMode::Cumulative)
            .with_comparison(ComparisonVariable::Type);
        let snapshot = compute_snapshot(&dataset, &config);

        assert!(snapshot.view.is_empty());
        assert!(snapshot.comparison.is_no_data());
        assert!(snapshot.metrics.cards.iter().all(|c| c.value == 0.0));
        assert_eq!(snapshot.key_figures.avg_total_spending, None);
    }

    #[test]
    fn test_refresh_reuses_cached_dataset() {
        let file = create_test_csv(&["Gold,30,2,4,3,50", "Silver,41,3,2,1,75"]);
        let mut pipeline = DashboardPipeline::new();
        let dataset = pipeline.dataset(file.path()).unwrap();
        let config = DashboardConfig::for_dataset(&dataset);

        for mode in [DisplayMode::Daily, DisplayMode::Cumulative] {
            pipeline
                .refresh(file.path(), &config.clone().with_display_mode(mode))
                .unwrap();
        }
        assert_eq!(pipeline.cache().stats().loads, 1);
        assert_eq!(pipeline.cache().stats().hits, 2);
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = DashboardPipeline::new();

        let err = pipeline.dataset(dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::Source(SourceError::NotFound { .. })));
    }

    #[test]
    fn test_default_source_file() {
        let pipeline = DashboardPipeline::new();
        assert_eq!(pipeline.source(), Path::new(DEFAULT_SOURCE_FILE));
    }

    #[test]
    fn test_configured_source_refresh() {
        let file = create_test_csv(&["Gold,30,2,4,3,50", "Silver,41,3,2,1,75"]);
        let mut pipeline = DashboardPipeline::new().with_source(file.path());

        let dataset = pipeline.load_source().unwrap();
        let snapshot = pipeline
            .refresh_source(&DashboardConfig::for_dataset(&dataset))
            .unwrap();
        assert_eq!(snapshot.view.len(), 2);
        assert_eq!(pipeline.cache().stats(), crate::cache::CacheStats { hits: 1, loads: 1 });
    }

    #[test]
    fn test_config_from_json_normalizes_types() {
        let file = create_test_csv(&["Gold,30,2,4,3,50", "Silver,41,3,2,1,75"]);
        let mut pipeline = DashboardPipeline::new().with_source(file.path());
        let dataset = pipeline.load_source().unwrap();

        let json = r#"{
            "filter": {
                "types": [" gold"],
                "age": {"start": 18, "end": 60},
                "year": {"start": 1, "end": 5}
            },
            "displayMode": "Cumulative"
        }"#;
        let config: DashboardConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.comparison, ComparisonVariable::Age);

        let snapshot = compute_snapshot(&dataset, &config);
        assert_eq!(snapshot.view.len(), 1);
        assert_eq!(snapshot.view.records()[0].member_type.as_str(), "Gold");
    }

    #[test]
    fn test_config_from_json_rejects_non_member() {
        let json = r#"{
            "filter": {
                "types": ["gold", "Non Member"],
                "age": {"start": 18, "end": 60},
                "year": {"start": 1, "end": 5}
            }
        }"#;
        assert!(serde_json::from_str::<DashboardConfig>(json).is_err());
    }

    #[test]
    fn test_config_and_snapshot_serialize() {
        let file = create_test_csv(&["Gold,30,2,4,3,50", "Silver,41,3,2,1,75"]);
        let mut pipeline = DashboardPipeline::new();
        let dataset = pipeline.dataset(file.path()).unwrap();
        let config = DashboardConfig::for_dataset(&dataset);

        let json = serde_json::to_string(&config).unwrap();
        let back: DashboardConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);

        let snapshot = compute_snapshot(&dataset, &config);
        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(value["comparison"]["kind"], "scatter");
        assert_eq!(value["view"][1]["Type"], "Silver");
        assert_eq!(value["metrics"]["cards"][0]["series"][0]["date"], "2023-01-01");
    }
}
