//! Merging a live intraday price into the daily series.

use crate::domain::{DailyBar, PriceSeries};
use chrono::NaiveDate;

/// Fold the latest intraday price into the series for `as_of`.
///
/// - No price: the series is returned unchanged.
/// - Last date equals `as_of`: that day's adjusted close is overwritten in
///   place (the cached end-of-day value is provisional for "today").
/// - Last date before `as_of`: a new row is appended, all fields NaN except
///   the adjusted close.
/// - Last date after `as_of` (stale request): unchanged — future-dated rows
///   are never overwritten.
pub fn merge_latest(mut series: PriceSeries, price: Option<f64>, as_of: NaiveDate) -> PriceSeries {
    let Some(price) = price else {
        return series;
    };

    match series.last_date() {
        Some(last) if last == as_of => {
            if let Some(bar) = series.bars.last_mut() {
                bar.adj_close = price;
            }
        }
        Some(last) if last < as_of => {
            series.bars.push(DailyBar::from_adj_close(as_of, price));
        }
        Some(_) => {} // last date is in the future of as_of; leave it alone
        None => {
            series.bars.push(DailyBar::from_adj_close(as_of, price));
        }
    }

    series
}
