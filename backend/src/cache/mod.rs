//! Dataset cache - load each source once per session
//!
//! Normalized datasets are memoized by source identity (canonical path,
//! modification time and size). A source whose identity changes is reloaded
//! on next access; an unchanged one is served from memory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::{SourceError, SourceResult};
use crate::logs::log_info;
use crate::models::Dataset;
use crate::transform::normalize::load_dataset;

/// What a cached dataset was loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIdentity {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl SourceIdentity {
    /// Stat the source; a missing file is [`SourceError::NotFound`].
    pub fn of(path: &Path) -> SourceResult<Self> {
        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceError::NotFound { path: path.to_path_buf() },
            _ => SourceError::Io(e),
        })?;
        let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        Ok(Self {
            path: canonical,
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

/// A dataset together with the identity it was loaded from
#[derive(Debug, Clone)]
pub struct CachedDataset {
    pub identity: SourceIdentity,
    pub dataset: Arc<Dataset>,
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub loads: u64,
}

/// Memoizes normalized datasets per source
#[derive(Debug, Default)]
pub struct DatasetCache {
    /// Loaded datasets (canonical path -> dataset)
    entries: HashMap<PathBuf, CachedDataset>,
    stats: CacheStats,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the dataset for `path`, loading it if absent or stale.
    ///
    /// Load failures are not cached; the next call tries again.
    pub fn get_or_load(&mut self, path: impl AsRef<Path>) -> SourceResult<Arc<Dataset>> {
        let identity = SourceIdentity::of(path.as_ref())?;

        if let Some(cached) = self.entries.get(&identity.path) {
            if cached.identity == identity {
                self.stats.hits += 1;
                return Ok(Arc::clone(&cached.dataset));
            }
            log_info(format!("{} changed on disk, reloading", identity.path.display()));
        }

        let dataset = Arc::new(load_dataset(&identity.path)?);
        self.stats.loads += 1;
        self.entries.insert(
            identity.path.clone(),
            CachedDataset {
                identity,
                dataset: Arc::clone(&dataset),
            },
        );
        Ok(dataset)
    }

    /// Cached entry for `path`, without touching the filesystem beyond
    /// resolving the path
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&CachedDataset> {
        let path = path.as_ref();
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.entries.get(&key)
    }

    /// Forget one source. Returns whether it was cached.
    pub fn invalidate(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.entries.remove(&key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
