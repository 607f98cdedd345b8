//! Rolling SMA, threshold bands, and the BUY/SELL sweep.

use crate::domain::{PriceSeries, Signal, SignalRow};

/// Rolling arithmetic mean over a trailing window.
///
/// NaN until index `window - 1`; a NaN inside the window propagates to its
/// output, with the running sum recomputed once the NaN leaves.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    assert!(window >= 1, "window must be >= 1");

    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < window {
        return result;
    }

    let mut sum = 0.0;
    let mut nan_in_window = false;
    for &v in values.iter().take(window) {
        if v.is_nan() {
            nan_in_window = true;
        }
        sum += v;
    }
    if !nan_in_window {
        result[window - 1] = sum / window as f64;
    }

    for i in window..n {
        let leaving = values[i - window];
        let entering = values[i];
        sum = sum - leaving + entering;

        if entering.is_nan() || leaving.is_nan() || nan_in_window {
            // Rescan the window; the incremental sum is poisoned.
            nan_in_window = false;
            sum = 0.0;
            for &v in &values[(i + 1 - window)..=i] {
                if v.is_nan() {
                    nan_in_window = true;
                }
                sum += v;
            }
            if nan_in_window {
                continue;
            }
        }

        result[i] = sum / window as f64;
    }

    result
}

/// Compute SMA, threshold bands, and signals over a (gapless) series.
///
/// Rows with an undefined SMA are dropped. The sweep runs chronologically
/// carrying a single `invested` flag: crossing at-or-above the upper band
/// while flat emits BUY; dropping strictly below the lower band while
/// invested emits SELL. The inclusive-upper / exclusive-lower asymmetry is
/// deliberate — a price resting exactly on the lower band does not exit.
pub fn compute_signals(series: &PriceSeries, ma_window: usize, threshold: f64) -> Vec<SignalRow> {
    assert!(ma_window >= 1, "ma_window must be >= 1");
    assert!(threshold >= 0.0, "threshold must be non-negative");

    let closes: Vec<f64> = series.bars.iter().map(|b| b.adj_close).collect();
    let sma = rolling_mean(&closes, ma_window);

    let mut rows = Vec::with_capacity(series.len().saturating_sub(ma_window - 1));
    let mut invested = false;

    for (bar, &sma_value) in series.bars.iter().zip(&sma) {
        if sma_value.is_nan() {
            continue;
        }

        let upper_band = sma_value * (1.0 + threshold);
        let lower_band = sma_value * (1.0 - threshold);

        let signal = if !invested && bar.adj_close >= upper_band {
            invested = true;
            Some(Signal::Buy)
        } else if invested && bar.adj_close < lower_band {
            invested = false;
            Some(Signal::Sell)
        } else {
            None
        };

        rows.push(SignalRow {
            date: bar.date,
            adj_close: bar.adj_close,
            sma: sma_value,
            upper_band,
            lower_band,
            signal,
        });
    }

    rows
}
