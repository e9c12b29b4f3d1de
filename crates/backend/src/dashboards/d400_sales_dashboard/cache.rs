use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use super::error::LoadError;
use super::loader::LoadParams;
use super::table::LoadedTable;

/// Размер и время изменения файла: признак того, что файл поменялся на диске
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFingerprint {
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SourceFingerprint {
    /// `None` when the file cannot be stat'ed
    pub fn of(path: &Path) -> Option<Self> {
        let metadata = std::fs::metadata(path).ok()?;
        Some(Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

struct CacheEntry {
    params: LoadParams,
    fingerprint: SourceFingerprint,
    loaded: Arc<LoadedTable>,
}

/// Кэш последней успешной загрузки.
///
/// Запись отдаётся, пока совпадают параметры загрузки и отпечаток файла.
/// Ошибки загрузки не кэшируются.
#[derive(Default)]
pub struct TableCache {
    entry: RwLock<Option<CacheEntry>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load<F>(&self, params: &LoadParams, load: F) -> Result<Arc<LoadedTable>, LoadError>
    where
        F: FnOnce(&LoadParams) -> Result<LoadedTable, LoadError>,
    {
        let fingerprint = SourceFingerprint::of(&params.path);

        if let Some(hit) = self.lookup(params, fingerprint) {
            return Ok(hit);
        }

        // Only one loader runs at a time; others wait and reuse its result
        let mut guard = self.entry.write();
        if let Some(entry) = guard.as_ref() {
            if Self::is_fresh(entry, params, fingerprint) {
                return Ok(entry.loaded.clone());
            }
        }

        if guard.is_some() {
            tracing::info!("D400 Cache: source changed or parameters differ, reloading");
        }

        let loaded = Arc::new(load(params)?);
        *guard = fingerprint.map(|fingerprint| CacheEntry {
            params: params.clone(),
            fingerprint,
            loaded: loaded.clone(),
        });
        Ok(loaded)
    }

    /// Drops the cached table; the next request reloads from disk
    pub fn invalidate(&self) -> bool {
        let dropped = self.entry.write().take().is_some();
        tracing::info!("D400 Cache: invalidated (entry dropped: {})", dropped);
        dropped
    }

    /// Cached table regardless of freshness
    #[cfg(test)]
    fn current(&self) -> Option<Arc<LoadedTable>> {
        self.entry.read().as_ref().map(|e| e.loaded.clone())
    }

    fn lookup(
        &self,
        params: &LoadParams,
        fingerprint: Option<SourceFingerprint>,
    ) -> Option<Arc<LoadedTable>> {
        let guard = self.entry.read();
        let entry = guard.as_ref()?;
        if Self::is_fresh(entry, params, fingerprint) {
            Some(entry.loaded.clone())
        } else {
            None
        }
    }

    fn is_fresh(
        entry: &CacheEntry,
        params: &LoadParams,
        fingerprint: Option<SourceFingerprint>,
    ) -> bool {
        entry.params == *params && fingerprint == Some(entry.fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d400_sales_dashboard::table::fixtures::{row, table};
    use crate::dashboards::d400_sales_dashboard::table::LoadReport;
    use crate::shared::config::default_config;
    use chrono::Utc;
    use std::cell::Cell;

    fn params_for(path: &Path) -> LoadParams {
        let mut source = default_config().unwrap().source;
        source.path = path.to_string_lossy().into_owned();
        LoadParams::from_source(&source).unwrap()
    }

    fn loaded(line: &str) -> LoadedTable {
        LoadedTable {
            table: table(vec![row(1, 1.0, 1.0, line)]),
            report: LoadReport {
                source_path: "SALES_2022.xlsx".into(),
                sheet: "Продажи".to_string(),
                rows_read: 1,
                rejected: vec![],
                truncated: false,
                loaded_at: Utc::now(),
            },
        }
    }

    #[test]
    fn test_second_call_hits_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.xlsx");
        std::fs::write(&path, b"v1").unwrap();
        let params = params_for(&path);
        let cache = TableCache::new();
        let calls = Cell::new(0);

        let load = |_: &LoadParams| {
            calls.set(calls.get() + 1);
            Ok(loaded("A"))
        };
        let first = cache.get_or_load(&params, load).unwrap();
        let second = cache.get_or_load(&params, load).unwrap();

        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.xlsx");
        std::fs::write(&path, b"v1").unwrap();
        let params = params_for(&path);
        let cache = TableCache::new();

        cache.get_or_load(&params, |_| Ok(loaded("A"))).unwrap();
        assert!(cache.invalidate());
        assert!(cache.current().is_none());

        let reloaded = cache.get_or_load(&params, |_| Ok(loaded("B"))).unwrap();
        assert_eq!(reloaded.table.rows[0].product_line, "B");
        assert!(!TableCache::new().invalidate());
    }

    #[test]
    fn test_file_change_forces_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.xlsx");
        std::fs::write(&path, b"v1").unwrap();
        let params = params_for(&path);
        let cache = TableCache::new();

        cache.get_or_load(&params, |_| Ok(loaded("A"))).unwrap();
        std::fs::write(&path, b"version two").unwrap();
        let reloaded = cache.get_or_load(&params, |_| Ok(loaded("B"))).unwrap();

        assert_eq!(reloaded.table.rows[0].product_line, "B");
    }

    #[test]
    fn test_changed_params_force_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.xlsx");
        std::fs::write(&path, b"v1").unwrap();
        let params = params_for(&path);
        let cache = TableCache::new();

        cache.get_or_load(&params, |_| Ok(loaded("A"))).unwrap();
        let mut other = params.clone();
        other.max_rows = 10;
        let reloaded = cache.get_or_load(&other, |_| Ok(loaded("B"))).unwrap();

        assert_eq!(reloaded.table.rows[0].product_line, "B");
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.xlsx");
        std::fs::write(&path, b"v1").unwrap();
        let params = params_for(&path);
        let cache = TableCache::new();

        let err = cache
            .get_or_load(&params, |_| {
                Err(LoadError::MissingColumn {
                    column: "utm_source".to_string(),
                })
            })
            .unwrap_err();
        assert_eq!(err.code(), "missing_column");
        assert!(cache.current().is_none());

        let ok = cache.get_or_load(&params, |_| Ok(loaded("A"))).unwrap();
        assert_eq!(ok.table.len(), 1);
    }
}
