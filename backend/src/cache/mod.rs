//! Dataset cache - one cleaned dataset per source file, shared read-only.
//!
//! Entries are keyed by canonical path and validated against a
//! [`SourceFingerprint`] (size + modification time) on every lookup: a
//! changed file is reloaded and re-cleaned. [`DatasetCache::invalidate`] and
//! [`DatasetCache::clear`] drop entries explicitly.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use crate::api::logs::{log_info, log_success};
use crate::error::{LoadError, PipelineResult};
use crate::transform::pipeline::{load_dataset, PreparedDataset};

/// Process-wide cache used by the CLI and the HTTP server.
pub static DATASET_CACHE: Lazy<DatasetCache> = Lazy::new(DatasetCache::new);

/// Identity of a source file at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFingerprint {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SourceFingerprint {
    pub fn of(path: &Path) -> Result<Self, LoadError> {
        let io_err = |source| LoadError::Io {
            path: path.display().to_string(),
            source,
        };
        let canonical = path.canonicalize().map_err(io_err)?;
        let meta = std::fs::metadata(&canonical).map_err(io_err)?;

        Ok(Self {
            path: canonical,
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// A cached dataset and the fingerprint it was built from.
#[derive(Debug)]
pub struct CachedDataset {
    pub fingerprint: SourceFingerprint,
    pub dataset: PreparedDataset,
}

/// Cleaned datasets keyed by canonical source path.
pub struct DatasetCache {
    entries: Mutex<HashMap<PathBuf, Arc<CachedDataset>>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PathBuf, Arc<CachedDataset>>> {
        // Entries are only ever replaced whole, so a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached dataset for `path`, loading it on first use or when
    /// the file changed since it was cached.
    pub fn get_or_load(&self, path: &Path) -> PipelineResult<Arc<CachedDataset>> {
        let fingerprint = SourceFingerprint::of(path)?;
        let mut entries = self.entries();

        if let Some(cached) = entries.get(&fingerprint.path) {
            if cached.fingerprint == fingerprint {
                return Ok(Arc::clone(cached));
            }
            log_info(format!(
                "Source changed, reloading {}",
                fingerprint.path.display()
            ));
        }

        let dataset = load_dataset(&fingerprint.path)?;
        let cached = Arc::new(CachedDataset {
            fingerprint: fingerprint.clone(),
            dataset,
        });
        entries.insert(fingerprint.path, Arc::clone(&cached));
        log_success("Dataset cached");

        Ok(cached)
    }

    /// Drop the entry for `path`. Returns whether one existed.
    pub fn invalidate(&self, path: &Path) -> bool {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.entries().remove(&key).is_some()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use std::fs;
    use tempfile::tempdir;

    const HEADER: &str =
        "Order ID,Order Date,Customer Name,Segment,Region,Product Name,Category,Sub-Category,Sales\n";

    fn write_dataset(path: &Path, rows: &[&str]) {
        let mut content = HEADER.to_string();
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_second_lookup_reuses_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        write_dataset(&path, &["CA-1,01/01/2023,A,Consumer,East,P,Furniture,Chairs,10"]);

        let cache = DatasetCache::new();
        let first = cache.get_or_load(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_changed_source_is_reloaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        write_dataset(&path, &["CA-1,01/01/2023,A,Consumer,East,P,Furniture,Chairs,10"]);

        let cache = DatasetCache::new();
        let first = cache.get_or_load(&path).unwrap();
        assert_eq!(first.dataset.table.len(), 1);

        write_dataset(
            &path,
            &[
                "CA-1,01/01/2023,A,Consumer,East,P,Furniture,Chairs,10",
                "CA-2,02/01/2023,B,Corporate,West,Q,Technology,Phones,25",
            ],
        );
        let second = cache.get_or_load(&path).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.dataset.table.len(), 2);
        // Holders of the old entry keep an unchanged snapshot
        assert_eq!(first.dataset.table.len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        write_dataset(&a, &["CA-1,01/01/2023,A,Consumer,East,P,Furniture,Chairs,10"]);
        write_dataset(&b, &["CA-2,01/01/2023,A,Consumer,East,P,Furniture,Chairs,10"]);

        let cache = DatasetCache::new();
        let first = cache.get_or_load(&a).unwrap();
        cache.get_or_load(&b).unwrap();
        assert_eq!(cache.len(), 2);

        assert!(cache.invalidate(&a));
        assert!(!cache.invalidate(&a));
        assert_eq!(cache.len(), 1);

        let reloaded = cache.get_or_load(&a).unwrap();
        assert!(!Arc::ptr_eq(&first, &reloaded));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_missing_source_is_load_error() {
        let dir = tempdir().unwrap();
        let cache = DatasetCache::new();
        let result = cache.get_or_load(&dir.path().join("nope.csv"));

        assert!(matches!(result, Err(PipelineError::Load(LoadError::Io { .. }))));
        assert!(cache.is_empty());
    }
}
