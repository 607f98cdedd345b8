//! HTTP routes: the chart page, figure JSON, config read/save, health.

use crate::render;
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, warn};
use trendview_core::config::HyperParams;
use trendview_core::engine::ChartRequest;

const INDEX_HTML: &str = include_str!("index.html");

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/api/chart", get(chart))
        .route("/api/config", get(get_config).post(save_config))
        .route("/health", get(health))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Query parameters for a chart render. Anything missing or unparsable is
/// substituted from the persisted defaults.
#[derive(Debug, Deserialize)]
pub struct ChartParams {
    pub symbol: Option<String>,
    pub ma_window: Option<usize>,
    pub threshold: Option<f64>,
    pub months: Option<u32>,
    #[serde(default)]
    pub log: bool,
    pub overwrite: Option<f64>,
}

/// Resolve request parameters against the persisted defaults, discarding
/// values that cannot drive a computation.
pub fn resolve_params(params: &ChartParams, defaults: &HyperParams) -> (usize, f64, u32) {
    let ma_window = match params.ma_window {
        Some(w) if w >= 1 => w,
        _ => defaults.ma_window,
    };
    let threshold = match params.threshold {
        Some(t) if t >= 0.0 && t.is_finite() => t,
        _ => defaults.threshold,
    };
    let months = match params.months {
        Some(m) if m >= 1 => m,
        _ => defaults.default_months_show,
    };
    (ma_window, threshold, months)
}

/// GET /api/chart — always 200: pipeline failures become an error figure
/// so the page's refresh timer keeps ticking.
async fn chart(State(state): State<AppState>, Query(params): Query<ChartParams>) -> Json<Value> {
    // Defaults are re-read from disk on every render.
    let defaults = state.store.load();
    let (ma_window, threshold, months) = resolve_params(&params, &defaults);

    let symbol = params
        .symbol
        .clone()
        .unwrap_or_else(|| state.settings.symbol.clone());
    let request = ChartRequest {
        symbol: symbol.clone(),
        intraday_symbol: state.settings.intraday_symbol.clone(),
        ma_window,
        threshold,
        overwrite: params.overwrite,
    };

    let engine = state.engine.clone();
    let result = tokio::task::spawn_blocking(move || {
        engine.build_chart_data_auto(&request, Utc::now())
    })
    .await;

    let figure = match result {
        Ok(Ok(data)) => render::figure(&symbol, &data.rows, months, params.log, data.warning.as_deref()),
        Ok(Err(e)) => {
            warn!(%symbol, error = %e, "render failed");
            render::error_figure(&e.to_string())
        }
        Err(e) => {
            error!(error = %e, "render task panicked");
            render::error_figure("internal error")
        }
    };

    Json(figure)
}

async fn get_config(State(state): State<AppState>) -> Json<HyperParams> {
    Json(state.store.load())
}

async fn save_config(
    State(state): State<AppState>,
    Json(params): Json<HyperParams>,
) -> Result<Json<HyperParams>, (StatusCode, String)> {
    state
        .store
        .save(&params)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("save failed: {e}")))?;
    Ok(Json(params))
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> HyperParams {
        HyperParams::default()
    }

    #[test]
    fn missing_params_fall_back_to_defaults() {
        let params = ChartParams {
            symbol: None,
            ma_window: None,
            threshold: None,
            months: None,
            log: false,
            overwrite: None,
        };
        let (w, t, m) = resolve_params(&params, &defaults());
        assert_eq!(w, defaults().ma_window);
        assert_eq!(t, defaults().threshold);
        assert_eq!(m, defaults().default_months_show);
    }

    #[test]
    fn zero_window_is_rejected() {
        let params = ChartParams {
            symbol: None,
            ma_window: Some(0),
            threshold: None,
            months: Some(0),
            log: false,
            overwrite: None,
        };
        let (w, _, m) = resolve_params(&params, &defaults());
        assert_eq!(w, defaults().ma_window);
        assert_eq!(m, defaults().default_months_show);
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let params = ChartParams {
            symbol: None,
            ma_window: Some(50),
            threshold: Some(-0.5),
            months: None,
            log: false,
            overwrite: None,
        };
        let (w, t, _) = resolve_params(&params, &defaults());
        assert_eq!(w, 50);
        assert_eq!(t, defaults().threshold);
    }

    #[test]
    fn valid_params_pass_through() {
        let params = ChartParams {
            symbol: Some("SPY".into()),
            ma_window: Some(21),
            threshold: Some(0.03),
            months: Some(3),
            log: true,
            overwrite: None,
        };
        let (w, t, m) = resolve_params(&params, &defaults());
        assert_eq!((w, t, m), (21, 0.03, 3));
    }
}
