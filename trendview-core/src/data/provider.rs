//! Market-data provider traits and structured error types.
//!
//! Two query shapes are consumed upstream: full daily history for a symbol
//! and minute bars for a bounded recent window. Both sit behind traits so
//! the engine can be exercised against mocks.

use crate::domain::DailyBar;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("cache error: {0}")]
    CacheError(String),

    #[error("no cached data for symbol '{symbol}'")]
    NoCachedData { symbol: String },

    #[error("data error: {0}")]
    Other(String),
}

/// A single minute-granularity observation. `adj_close` may be NaN when the
/// provider reported the minute without a value.
#[derive(Debug, Clone, Copy)]
pub struct MinuteTick {
    pub timestamp: DateTime<Utc>,
    pub adj_close: f64,
}

/// Full daily history, "as much as available".
pub trait DailyHistoryProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the complete daily OHLCV history for a symbol, ascending.
    fn fetch_daily_history(&self, symbol: &str) -> Result<Vec<DailyBar>, DataError>;
}

/// Minute bars for a bounded recent time window.
pub trait IntradayProvider: Send + Sync {
    /// Fetch minute observations in `[start, end]`, ascending. An empty
    /// result is legitimate (no trades in the window), not an error.
    fn fetch_minute_ticks(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MinuteTick>, DataError>;
}
