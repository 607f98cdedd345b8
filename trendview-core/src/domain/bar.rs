//! DailyBar and PriceSeries — the fundamental market data units.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single calendar day.
///
/// Missing numeric fields are `f64::NAN`. A row appended from an intraday
/// tick starts as all-NaN except `adj_close`; `reindex_fill` later carries
/// the surrounding values into the gaps. All signal math runs on `adj_close`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: f64,
}

impl DailyBar {
    /// A bar with every field NaN except `adj_close` — the shape produced
    /// when a live intraday price lands on a date the daily history does
    /// not cover yet.
    pub fn from_adj_close(date: NaiveDate, adj_close: f64) -> Self {
        Self {
            date,
            open: f64::NAN,
            high: f64::NAN,
            low: f64::NAN,
            close: f64::NAN,
            adj_close,
            volume: f64::NAN,
        }
    }

    /// Returns true if any field is NaN.
    pub fn has_gaps(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.adj_close.is_nan()
            || self.volume.is_nan()
    }

    /// Copy of this bar restamped with a different date (placeholder rows
    /// in the degraded path).
    pub fn restamped(&self, date: NaiveDate) -> Self {
        Self {
            date,
            ..self.clone()
        }
    }
}

/// Ordered daily price history for one symbol.
///
/// Invariant maintained by the constructors and the engine: bars are sorted
/// by date ascending with unique dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub bars: Vec<DailyBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, mut bars: Vec<DailyBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// True when every calendar day in `[first_date, last_date]` has a bar.
    pub fn is_gapless(&self) -> bool {
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => {
                let span = (last - first).num_days() as usize + 1;
                span == self.bars.len()
            }
            _ => true,
        }
    }
}
