//! On-disk CSV cache of daily history, one file per symbol.
//!
//! Layout: `{data_dir}/{normalized_symbol}.csv` with columns
//! `Date,Open,High,Low,Close,Adjusted_Close,Volume`, ascending by date.
//!
//! Freshness rule: a cached copy whose last date is today-or-later is
//! returned unmodified; anything older triggers a full re-fetch that
//! overwrites the file. Writes are atomic (write to .tmp, rename into
//! place). A corrupt or missing file reads as a cache miss.

use super::provider::{DailyHistoryProvider, DataError};
use crate::domain::{DailyBar, PriceSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// CSV row layout shared by the reader and writer.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Adjusted_Close")]
    adj_close: f64,
    #[serde(rename = "Volume")]
    volume: f64,
}

impl From<&DailyBar> for CsvRow {
    fn from(bar: &DailyBar) -> Self {
        Self {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            adj_close: bar.adj_close,
            volume: bar.volume,
        }
    }
}

impl From<CsvRow> for DailyBar {
    fn from(row: CsvRow) -> Self {
        Self {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            adj_close: row.adj_close,
            volume: row.volume,
        }
    }
}

/// Cache file name for a symbol: strip the leading `^` index prefix,
/// lowercase the rest.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim_start_matches('^').to_lowercase()
}

/// The daily-history cache. Owns the on-disk files; callers get in-memory
/// copies and never write intraday adjustments back.
pub struct HistoryCache {
    data_dir: PathBuf,
    provider: Arc<dyn DailyHistoryProvider>,
}

impl HistoryCache {
    pub fn new(data_dir: impl Into<PathBuf>, provider: Arc<dyn DailyHistoryProvider>) -> Self {
        Self {
            data_dir: data_dir.into(),
            provider,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn cache_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", normalize_symbol(symbol)))
    }

    /// Daily history for a symbol, "fresh enough" for `today`: the cached
    /// copy if its last date is today-or-later, otherwise a full upstream
    /// re-fetch that overwrites the cache.
    pub fn get_daily_history(
        &self,
        symbol: &str,
        today: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        match self.load(symbol) {
            Ok(series) if series.last_date().is_some_and(|d| d >= today) => {
                debug!(symbol, "cache hit, fresh");
                return Ok(series);
            }
            Ok(_) => debug!(symbol, "cache stale, refetching"),
            Err(DataError::NoCachedData { .. }) => debug!(symbol, "cache miss, fetching"),
            Err(e) => return Err(e),
        }
        self.refresh(symbol)
    }

    /// Fetch the full history upstream and overwrite the cache file.
    pub fn refresh(&self, symbol: &str) -> Result<PriceSeries, DataError> {
        debug!(symbol, provider = self.provider.name(), "fetching full history");
        let bars = self.provider.fetch_daily_history(symbol)?;
        let series = PriceSeries::new(symbol, bars);
        self.write(&series)?;
        Ok(series)
    }

    /// Snapshot-only read: the on-disk series, with no upstream traffic.
    /// Missing and corrupt files both read as `NoCachedData`.
    pub fn load(&self, symbol: &str) -> Result<PriceSeries, DataError> {
        let path = self.cache_path(symbol);
        if !path.exists() {
            return Err(DataError::NoCachedData {
                symbol: symbol.to_string(),
            });
        }

        let mut reader = match csv::Reader::from_path(&path) {
            Ok(r) => r,
            Err(e) => {
                warn!(symbol, error = %e, "unreadable cache file, treating as miss");
                return Err(DataError::NoCachedData {
                    symbol: symbol.to_string(),
                });
            }
        };

        let mut bars = Vec::new();
        for record in reader.deserialize::<CsvRow>() {
            match record {
                Ok(row) => bars.push(DailyBar::from(row)),
                Err(e) => {
                    warn!(symbol, error = %e, "corrupt cache row, treating file as miss");
                    return Err(DataError::NoCachedData {
                        symbol: symbol.to_string(),
                    });
                }
            }
        }

        if bars.is_empty() {
            return Err(DataError::NoCachedData {
                symbol: symbol.to_string(),
            });
        }

        Ok(PriceSeries::new(symbol, bars))
    }

    /// Write a series to its cache file, creating the data directory if
    /// absent. Atomic: write to .tmp, rename into place.
    pub fn write(&self, series: &PriceSeries) -> Result<(), DataError> {
        if series.is_empty() {
            return Err(DataError::CacheError("no bars to cache".into()));
        }

        fs::create_dir_all(&self.data_dir)
            .map_err(|e| DataError::CacheError(format!("failed to create dir: {e}")))?;

        let path = self.cache_path(&series.symbol);
        let tmp_path = path.with_extension("csv.tmp");

        let mut writer = csv::Writer::from_path(&tmp_path)
            .map_err(|e| DataError::CacheError(format!("create file: {e}")))?;
        for bar in &series.bars {
            writer
                .serialize(CsvRow::from(bar))
                .map_err(|e| DataError::CacheError(format!("write row: {e}")))?;
        }
        writer
            .flush()
            .map_err(|e| DataError::CacheError(format!("flush: {e}")))?;
        drop(writer);

        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::CacheError(format!("atomic rename failed: {e}"))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedProvider {
        bars: Vec<DailyBar>,
        calls: AtomicUsize,
    }

    impl FixedProvider {
        fn new(bars: Vec<DailyBar>) -> Self {
            Self {
                bars,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl DailyHistoryProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn fetch_daily_history(&self, _symbol: &str) -> Result<Vec<DailyBar>, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.bars.is_empty() {
                return Err(DataError::NetworkUnreachable("no data".into()));
            }
            Ok(self.bars.clone())
        }
    }

    fn bar(date: &str, adj_close: f64) -> DailyBar {
        DailyBar {
            date: date.parse().unwrap(),
            open: adj_close - 1.0,
            high: adj_close + 1.0,
            low: adj_close - 2.0,
            close: adj_close,
            adj_close,
            volume: 1000.0,
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn normalize_strips_caret_and_lowercases() {
        assert_eq!(normalize_symbol("^GSPC"), "gspc");
        assert_eq!(normalize_symbol("SPY"), "spy");
    }

    #[test]
    fn write_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FixedProvider::new(vec![]));
        let cache = HistoryCache::new(dir.path(), provider);

        let series = PriceSeries::new("^GSPC", vec![bar("2024-01-02", 100.0), bar("2024-01-03", 101.0)]);
        cache.write(&series).unwrap();

        assert!(dir.path().join("gspc.csv").exists());

        let loaded = cache.load("^GSPC").unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.bars[0].date, date("2024-01-02"));
        assert_eq!(loaded.bars[1].adj_close, 101.0);
    }

    #[test]
    fn load_missing_is_cache_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = HistoryCache::new(dir.path(), Arc::new(FixedProvider::new(vec![])));
        assert!(matches!(
            cache.load("SPY"),
            Err(DataError::NoCachedData { .. })
        ));
    }

    #[test]
    fn load_corrupt_is_cache_miss() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("spy.csv"), "Date,Open\nnot-a-date,zzz\n").unwrap();
        let cache = HistoryCache::new(dir.path(), Arc::new(FixedProvider::new(vec![])));
        assert!(matches!(
            cache.load("SPY"),
            Err(DataError::NoCachedData { .. })
        ));
    }

    #[test]
    fn fresh_cache_is_returned_without_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FixedProvider::new(vec![bar("2024-01-05", 200.0)]));
        let cache = HistoryCache::new(dir.path(), provider.clone());

        let cached = PriceSeries::new("SPY", vec![bar("2024-01-02", 100.0), bar("2024-01-03", 101.0)]);
        cache.write(&cached).unwrap();

        let got = cache
            .get_daily_history("SPY", date("2024-01-03"))
            .unwrap();
        assert_eq!(got.bars[1].adj_close, 101.0);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn stale_cache_triggers_refetch_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FixedProvider::new(vec![
            bar("2024-01-02", 100.0),
            bar("2024-01-04", 102.0),
        ]));
        let cache = HistoryCache::new(dir.path(), provider.clone());

        let stale = PriceSeries::new("SPY", vec![bar("2024-01-02", 100.0)]);
        cache.write(&stale).unwrap();

        let got = cache
            .get_daily_history("SPY", date("2024-01-04"))
            .unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        // The overwrite is visible on the next snapshot read.
        let reloaded = cache.load("SPY").unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.last_date(), Some(date("2024-01-04")));
    }

    #[test]
    fn miss_triggers_fetch_and_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data");
        let provider = Arc::new(FixedProvider::new(vec![bar("2024-01-02", 100.0)]));
        let cache = HistoryCache::new(&nested, provider);

        let got = cache
            .get_daily_history("^GSPC", date("2024-01-02"))
            .unwrap();
        assert_eq!(got.len(), 1);
        assert!(nested.join("gspc.csv").exists());
    }

    #[test]
    fn fetch_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let cache = HistoryCache::new(dir.path(), Arc::new(FixedProvider::new(vec![])));
        assert!(matches!(
            cache.get_daily_history("SPY", date("2024-01-02")),
            Err(DataError::NetworkUnreachable(_))
        ));
    }
}
