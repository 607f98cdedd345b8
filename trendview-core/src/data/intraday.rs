//! Intraday fetcher — the most recent observed price in a short window.

use super::provider::{DataError, IntradayProvider};
use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use std::sync::Arc;
use tracing::debug;

/// Trailing window queried for minute bars.
const LOOKBACK_MINUTES: i64 = 30;

/// The latest observed price and the calendar day it stamps.
///
/// `as_of` is the date of the *request*, not of the observation — it is the
/// effective "today" the merge step keys on. `price: None` means no valid
/// tick in the window, which is a legitimate result, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntradayQuote {
    pub price: Option<f64>,
    pub as_of: NaiveDate,
}

/// Fetches the most recent minute-granularity price for a symbol.
pub struct IntradayFetcher {
    provider: Arc<dyn IntradayProvider>,
}

impl IntradayFetcher {
    pub fn new(provider: Arc<dyn IntradayProvider>) -> Self {
        Self { provider }
    }

    /// Most recent non-missing adjusted close in the trailing 30-minute
    /// window ending at `now`, stamped with `now`'s calendar date.
    pub fn latest_price(
        &self,
        symbol: &str,
        now: DateTime<Utc>,
    ) -> Result<IntradayQuote, DataError> {
        let end = now
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(now);
        let start = end - Duration::minutes(LOOKBACK_MINUTES);

        let ticks = self.provider.fetch_minute_ticks(symbol, start, end)?;
        let price = ticks
            .iter()
            .rev()
            .map(|t| t.adj_close)
            .find(|p| !p.is_nan());

        debug!(symbol, ?price, "intraday window resolved");

        Ok(IntradayQuote {
            price,
            as_of: now.date_naive(),
        })
    }
}
