//! The signal engine: merge, reindex, sweep, and the orchestration that
//! ties the clock, cache, and intraday fetcher together.
//!
//! `build_chart_data` is the live path, gated hard on the market being in
//! session. `build_chart_data_cached` is the degraded path that renders
//! from the on-disk snapshot alone, synthesizing a placeholder row for the
//! next trading session when the snapshot lags. `build_chart_data_auto`
//! tries live and falls back.

pub mod merge;
pub mod reindex;
pub mod signals;

pub use merge::merge_latest;
pub use reindex::{apply_overwrite, reindex_fill};
pub use signals::{compute_signals, rolling_mean};

use crate::calendar::MarketClock;
use crate::config::HyperParams;
use crate::data::{DataError, HistoryCache, IntradayFetcher};
use crate::domain::SignalRow;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

/// How far past "today" the degraded path looks for the next session when
/// stamping its placeholder row. Long enough to clear any holiday cluster.
const PLACEHOLDER_HORIZON_DAYS: i64 = 7;

/// Failures of the computation pipeline, in the order a caller should
/// consider falling back.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Live-augmented computation requested outside the exchange session.
    /// Recoverable: render from cache instead.
    #[error("market is closed")]
    MarketClosed,

    /// Upstream fetch failed or returned nothing. Recoverable by cache
    /// fallback; fatal only if no cache exists.
    #[error("market data unavailable: {0}")]
    DataUnavailable(#[from] DataError),

    /// Neither live nor cached data exists for the symbol. Terminal for
    /// this render.
    #[error("no data available for symbol '{symbol}'")]
    NoDataAvailable { symbol: String },
}

/// One render request: symbol, parameters, optional what-if overwrite.
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub symbol: String,
    /// Distinct symbol for the intraday quote (e.g. a tradable proxy for
    /// an index). Defaults to `symbol`.
    pub intraday_symbol: Option<String>,
    pub ma_window: usize,
    pub threshold: f64,
    pub overwrite: Option<f64>,
}

impl ChartRequest {
    pub fn new(symbol: impl Into<String>, params: &HyperParams) -> Self {
        Self {
            symbol: symbol.into(),
            intraday_symbol: None,
            ma_window: params.ma_window,
            threshold: params.threshold,
            overwrite: None,
        }
    }

    fn intraday_symbol(&self) -> &str {
        self.intraday_symbol.as_deref().unwrap_or(&self.symbol)
    }
}

/// The processed table plus render hints.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub rows: Vec<SignalRow>,
    /// User-visible caveat, e.g. the last point being a placeholder.
    pub warning: Option<String>,
    /// Whether the live intraday path produced this result.
    pub live: bool,
}

/// Orchestrates the pipeline. Borrows a copy of the cached series to
/// mutate in memory; intraday adjustments are never written back to disk.
pub struct SignalEngine {
    cache: HistoryCache,
    intraday: IntradayFetcher,
    clock: MarketClock,
}

impl SignalEngine {
    pub fn new(cache: HistoryCache, intraday: IntradayFetcher, clock: MarketClock) -> Self {
        Self {
            cache,
            intraday,
            clock,
        }
    }

    pub fn clock(&self) -> &MarketClock {
        &self.clock
    }

    /// Live-augmented signal table. Strict gate: errors with
    /// [`EngineError::MarketClosed`] when the exchange is not in session.
    pub fn build_chart_data(
        &self,
        req: &ChartRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<SignalRow>, EngineError> {
        if !self.clock.is_open(now) {
            return Err(EngineError::MarketClosed);
        }

        let today = self.clock.local_date(now);
        let history = self.cache.get_daily_history(&req.symbol, today)?;
        let quote = self.intraday.latest_price(req.intraday_symbol(), now)?;
        debug!(symbol = %req.symbol, price = ?quote.price, as_of = %quote.as_of, "merging live quote");

        let series = merge_latest(history, quote.price, quote.as_of);
        let series = reindex_fill(series);
        let series = apply_overwrite(series, req.overwrite);
        Ok(compute_signals(&series, req.ma_window, req.threshold))
    }

    /// Degraded path: render from the on-disk snapshot without touching
    /// the network. A snapshot that lags the calendar gets one placeholder
    /// row (last known bar, restamped to the next trading day) and a
    /// user-visible warning.
    pub fn build_chart_data_cached(
        &self,
        req: &ChartRequest,
        now: DateTime<Utc>,
    ) -> Result<ChartData, EngineError> {
        let today = self.clock.local_date(now);

        let mut series = self.cache.load(&req.symbol).map_err(|e| match e {
            DataError::NoCachedData { symbol } => EngineError::NoDataAvailable { symbol },
            other => EngineError::DataUnavailable(other),
        })?;

        let Some(last_date) = series.last_date() else {
            return Err(EngineError::NoDataAvailable {
                symbol: req.symbol.clone(),
            });
        };

        let mut warning = None;
        if last_date < today {
            // The placeholder lands on the first session the snapshot is
            // missing: a day already past, today itself, or the upcoming
            // session when today is a weekend or holiday.
            let horizon = today + chrono::Duration::days(PLACEHOLDER_HORIZON_DAYS);
            if let Some(next_session) = self.clock.calendar().next_trading_day(last_date, horizon) {
                let placeholder = series
                    .bars
                    .last()
                    .expect("series with a last_date has bars")
                    .restamped(next_session);
                series.bars.push(placeholder);
                warning = Some(format!(
                    "{next_session} is a placeholder (last cached close carried forward, not a live value)"
                ));
            }
        }

        let series = reindex_fill(series);
        let series = apply_overwrite(series, req.overwrite);
        let rows = compute_signals(&series, req.ma_window, req.threshold);

        Ok(ChartData {
            rows,
            warning,
            live: false,
        })
    }

    /// Live when possible, cached otherwise. `NoDataAvailable` is the only
    /// error that escapes.
    pub fn build_chart_data_auto(
        &self,
        req: &ChartRequest,
        now: DateTime<Utc>,
    ) -> Result<ChartData, EngineError> {
        match self.build_chart_data(req, now) {
            Ok(rows) => Ok(ChartData {
                rows,
                warning: None,
                live: true,
            }),
            Err(EngineError::MarketClosed) => {
                debug!(symbol = %req.symbol, "market closed, rendering from cache");
                self.build_chart_data_cached(req, now)
            }
            Err(EngineError::DataUnavailable(e)) => {
                warn!(symbol = %req.symbol, error = %e, "live fetch failed, rendering from cache");
                self.build_chart_data_cached(req, now)
            }
            Err(e @ EngineError::NoDataAvailable { .. }) => Err(e),
        }
    }
}
