//! TrendView Core — SMA trend-signal pipeline over daily price history.
//!
//! - Domain types (daily bars, price series, signal rows)
//! - Trading calendar and market clock (NYSE schedule, early closes)
//! - Data layer: Yahoo provider, CSV history cache, intraday fetcher
//! - Signal engine: merge, calendar reindexing, rolling SMA with threshold
//!   bands, BUY/SELL sweep, and live/cached orchestration
//! - Hyperparameter store (JSON, explicit load/save)
//!
//! Known limitation: the on-disk cache is read and written without locking.
//! Deployment is single-process; concurrent writers for the same symbol are
//! out of scope.

pub mod calendar;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;

pub use calendar::{MarketClock, NyseCalendar, TradingCalendar};
pub use config::{ConfigStore, HyperParams};
pub use data::{HistoryCache, IntradayFetcher, YahooProvider};
pub use domain::{DailyBar, PriceSeries, Signal, SignalRow};
pub use engine::{ChartData, ChartRequest, EngineError, SignalEngine};
