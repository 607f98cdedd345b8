//! Reindexing to a continuous calendar and the manual overwrite hook.
//!
//! Daily bars exist only for trading days, but the rolling window operates
//! on a uniform daily cadence so that "W days" keeps a fixed economic
//! meaning. Reindexing inserts every missing calendar day and fills each
//! field forward from the prior day, then backward for gaps at the very
//! start of history.

use crate::domain::{DailyBar, PriceSeries};
use chrono::Duration;
use std::collections::HashMap;

/// Number of NaN-fillable fields in a bar.
const FIELDS: usize = 6;

fn to_fields(bar: &DailyBar) -> [f64; FIELDS] {
    [bar.open, bar.high, bar.low, bar.close, bar.adj_close, bar.volume]
}

/// Forward-fill NaN cells from the last valid value, then backward-fill
/// anything still missing at the head.
fn fill_column(values: &mut [f64]) {
    let mut last_valid = f64::NAN;
    for v in values.iter_mut() {
        if v.is_nan() {
            *v = last_valid;
        } else {
            last_valid = *v;
        }
    }
    let mut next_valid = f64::NAN;
    for v in values.iter_mut().rev() {
        if v.is_nan() {
            *v = next_valid;
        } else {
            next_valid = *v;
        }
    }
}

/// Rebuild the series on a gapless calendar-day index from its minimum to
/// maximum date, forward/backward filling per field. Idempotent on an
/// already-gapless series.
pub fn reindex_fill(series: PriceSeries) -> PriceSeries {
    let (Some(first), Some(last)) = (series.first_date(), series.last_date()) else {
        return series;
    };

    let n_days = (last - first).num_days() as usize + 1;
    let mut columns = vec![vec![f64::NAN; n_days]; FIELDS];

    let by_date: HashMap<_, _> = series.bars.iter().map(|b| (b.date, b)).collect();
    for day_index in 0..n_days {
        let date = first + Duration::days(day_index as i64);
        if let Some(bar) = by_date.get(&date) {
            for (column, value) in columns.iter_mut().zip(to_fields(bar)) {
                column[day_index] = value;
            }
        }
    }

    for column in columns.iter_mut() {
        fill_column(column);
    }

    let bars = (0..n_days)
        .map(|i| DailyBar {
            date: first + Duration::days(i as i64),
            open: columns[0][i],
            high: columns[1][i],
            low: columns[2][i],
            close: columns[3][i],
            adj_close: columns[4][i],
            volume: columns[5][i],
        })
        .collect();

    PriceSeries {
        symbol: series.symbol,
        bars,
    }
}

/// Manual what-if correction from the UI boundary: replace the adjusted
/// close of the last row only. Applied after reindexing and before the SMA
/// computation.
pub fn apply_overwrite(mut series: PriceSeries, value: Option<f64>) -> PriceSeries {
    if let Some(value) = value {
        if let Some(last) = series.bars.last_mut() {
            last.adj_close = value;
        }
    }
    series
}
