//! Property tests for the signal pipeline invariants.
//!
//! 1. Reindexing is idempotent and always yields a gapless series
//! 2. The sweep never emits two consecutive BUYs (or SELLs)
//! 3. No emitted row has an undefined SMA; the first row is at or after
//!    the W-th day of the series
//! 4. Merging the same quote twice equals merging it once

use chrono::NaiveDate;
use proptest::prelude::*;
use trendview_core::domain::{DailyBar, PriceSeries, Signal};
use trendview_core::engine::{compute_signals, merge_latest, reindex_fill};

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

fn make_bar(day_offset: i64, adj_close: f64) -> DailyBar {
    DailyBar {
        date: start_date() + chrono::Duration::days(day_offset),
        open: adj_close,
        high: adj_close * 1.01,
        low: adj_close * 0.99,
        close: adj_close,
        adj_close,
        volume: 1000.0,
    }
}

/// A series with random day gaps (as daily history naturally has around
/// weekends and holidays) and a positive random walk for prices.
fn arb_gappy_series() -> impl Strategy<Value = PriceSeries> {
    proptest::collection::vec((1i64..4, 50.0f64..150.0), 2..60).prop_map(|steps| {
        let mut offset = 0;
        let bars = steps
            .into_iter()
            .map(|(gap, price)| {
                offset += gap;
                make_bar(offset, price)
            })
            .collect();
        PriceSeries::new("PROP", bars)
    })
}

fn arb_walk() -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(-0.05f64..0.05, 10..120).prop_map(|returns| {
        let mut price = 100.0;
        returns
            .into_iter()
            .map(|r| {
                price *= 1.0 + r;
                price
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn reindex_fill_yields_gapless(series in arb_gappy_series()) {
        let filled = reindex_fill(series);
        prop_assert!(filled.is_gapless());
        prop_assert!(filled.bars.iter().all(|b| !b.has_gaps()));
    }

    #[test]
    fn reindex_fill_is_idempotent(series in arb_gappy_series()) {
        let once = reindex_fill(series);
        let twice = reindex_fill(once.clone());

        prop_assert_eq!(once.len(), twice.len());
        for (a, b) in once.bars.iter().zip(&twice.bars) {
            prop_assert_eq!(a.date, b.date);
            prop_assert_eq!(a.adj_close, b.adj_close);
            prop_assert_eq!(a.open, b.open);
            prop_assert_eq!(a.volume, b.volume);
        }
    }

    #[test]
    fn sweep_alternates_buy_sell(
        closes in arb_walk(),
        window in 1usize..20,
        threshold in 0.0f64..0.1,
    ) {
        let bars = closes.iter().enumerate().map(|(i, &c)| make_bar(i as i64, c)).collect();
        let series = PriceSeries::new("PROP", bars);
        let rows = compute_signals(&series, window, threshold);

        let mut last_fired = None;
        for row in &rows {
            if let Some(sig) = row.signal {
                prop_assert_ne!(Some(sig), last_fired, "consecutive {:?}", sig);
                last_fired = Some(sig);
            }
        }
        // A SELL can only ever follow a BUY.
        if let Some(first) = rows.iter().find_map(|r| r.signal) {
            prop_assert_eq!(first, Signal::Buy);
        }
    }

    #[test]
    fn no_row_has_undefined_sma(
        closes in arb_walk(),
        window in 1usize..20,
    ) {
        let bars = closes.iter().enumerate().map(|(i, &c)| make_bar(i as i64, c)).collect();
        let series = PriceSeries::new("PROP", bars);
        let n = series.len();
        let rows = compute_signals(&series, window, 0.01);

        prop_assert!(rows.iter().all(|r| !r.sma.is_nan()));
        // Rows before the window has filled are dropped.
        prop_assert_eq!(rows.len(), n.saturating_sub(window - 1));
        if let Some(first) = rows.first() {
            let expected = start_date() + chrono::Duration::days(window as i64 - 1);
            prop_assert_eq!(first.date, expected);
        }
    }

    #[test]
    fn merge_same_quote_twice_equals_once(
        series in arb_gappy_series(),
        price in 50.0f64..150.0,
        ahead in 0i64..5,
    ) {
        let as_of = series.last_date().unwrap() + chrono::Duration::days(ahead);
        let once = merge_latest(series.clone(), Some(price), as_of);
        let twice = merge_latest(once.clone(), Some(price), as_of);

        prop_assert_eq!(once.len(), twice.len());
        prop_assert_eq!(
            once.bars.last().unwrap().adj_close,
            twice.bars.last().unwrap().adj_close
        );
    }
}
