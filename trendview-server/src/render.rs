//! Render boundary: a signal table becomes a Plotly figure.
//!
//! Traces: close-price line, dashed SMA line, shaded threshold band,
//! up-markers at BUY rows, down-markers at SELL rows. Warnings ride in the
//! title. Errors become a figure whose title is the message, so the
//! client-side refresh loop keeps ticking no matter what.

use chrono::Months;
use serde_json::{json, Value};
use trendview_core::domain::{Signal, SignalRow};

/// Restrict the table to the trailing `months_show` months.
fn window_rows(rows: &[SignalRow], months_show: u32) -> &[SignalRow] {
    let Some(last) = rows.last() else {
        return rows;
    };
    let Some(cutoff) = last.date.checked_sub_months(Months::new(months_show)) else {
        return rows;
    };
    let start = rows.partition_point(|r| r.date < cutoff);
    &rows[start..]
}

/// Build the chart figure for a processed signal table.
pub fn figure(
    symbol: &str,
    rows: &[SignalRow],
    months_show: u32,
    log_scale: bool,
    warning: Option<&str>,
) -> Value {
    let rows = window_rows(rows, months_show);

    let dates: Vec<String> = rows.iter().map(|r| r.date.to_string()).collect();
    let closes: Vec<f64> = rows.iter().map(|r| r.adj_close).collect();
    let smas: Vec<f64> = rows.iter().map(|r| r.sma).collect();
    let uppers: Vec<f64> = rows.iter().map(|r| r.upper_band).collect();
    let lowers: Vec<f64> = rows.iter().map(|r| r.lower_band).collect();

    let buys: Vec<&SignalRow> = rows
        .iter()
        .filter(|r| r.signal == Some(Signal::Buy))
        .collect();
    let sells: Vec<&SignalRow> = rows
        .iter()
        .filter(|r| r.signal == Some(Signal::Sell))
        .collect();

    let mut title = format!("{symbol} Adjusted Close, SMA & Trend Signals");
    if let Some(warning) = warning {
        title.push_str(" — ");
        title.push_str(warning);
    }

    json!({
        "data": [
            {
                "type": "scatter",
                "x": dates,
                "y": closes,
                "mode": "lines",
                "name": "Adj Close",
                "line": {"color": "#222", "width": 2},
            },
            {
                "type": "scatter",
                "x": dates,
                "y": smas,
                "mode": "lines",
                "name": "SMA",
                "line": {"color": "#A020F0", "width": 2, "dash": "dash"},
            },
            {
                "type": "scatter",
                "x": dates,
                "y": uppers,
                "mode": "lines",
                "line": {"width": 0},
                "showlegend": false,
                "hoverinfo": "skip",
            },
            {
                "type": "scatter",
                "x": dates,
                "y": lowers,
                "mode": "lines",
                "fill": "tonexty",
                "fillcolor": "rgba(112, 128, 144, 0.18)",
                "line": {"width": 0},
                "name": "Threshold Band",
                "showlegend": true,
                "hoverinfo": "skip",
            },
            {
                "type": "scatter",
                "x": buys.iter().map(|r| r.date.to_string()).collect::<Vec<_>>(),
                "y": buys.iter().map(|r| r.adj_close).collect::<Vec<_>>(),
                "mode": "markers",
                "marker": {
                    "symbol": "triangle-up",
                    "color": "#27AE60",
                    "size": 12,
                    "line": {"width": 2, "color": "#155d27"},
                },
                "name": "Buy",
            },
            {
                "type": "scatter",
                "x": sells.iter().map(|r| r.date.to_string()).collect::<Vec<_>>(),
                "y": sells.iter().map(|r| r.adj_close).collect::<Vec<_>>(),
                "mode": "markers",
                "marker": {
                    "symbol": "triangle-down",
                    "color": "#C0392B",
                    "size": 12,
                    "line": {"width": 2, "color": "#7f1d1d"},
                },
                "name": "Sell",
            },
        ],
        "layout": layout(&title, log_scale),
    })
}

/// A figure carrying nothing but an error message in its title.
pub fn error_figure(message: &str) -> Value {
    json!({
        "data": [],
        "layout": layout(&format!("Error: {message}"), false),
    })
}

fn layout(title: &str, log_scale: bool) -> Value {
    json!({
        "margin": {"l": 30, "r": 20, "b": 40, "t": 40},
        "template": "plotly_white",
        "title": title,
        "xaxis": {"title": "Date"},
        "yaxis": {
            "title": "Price",
            "type": if log_scale { "log" } else { "linear" },
        },
        "legend": {"orientation": "h", "y": 1.05, "x": 1, "xanchor": "right"},
        "uirevision": "trendview-chart",
    })
}
