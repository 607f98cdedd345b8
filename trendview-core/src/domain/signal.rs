//! Signal rows — the processed table the chart renders.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Discrete trade signal emitted by the chronological sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
}

/// One output row: price, rolling stats, threshold bands, and the signal
/// fired on that day (if any). Rows where the SMA is undefined are never
/// emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRow {
    pub date: NaiveDate,
    pub adj_close: f64,
    pub sma: f64,
    pub upper_band: f64,
    pub lower_band: f64,
    pub signal: Option<Signal>,
}
