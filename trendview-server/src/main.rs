//! TrendView chart server.
//!
//! Serves a Plotly page with periodic refresh plus the figure/config API,
//! on top of the blocking signal pipeline (run via `spawn_blocking`).

mod config;
mod render;
mod routes;

use config::ServerConfig;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trendview_core::calendar::{MarketClock, NyseCalendar};
use trendview_core::config::ConfigStore;
use trendview_core::data::{HistoryCache, IntradayFetcher, YahooProvider};
use trendview_core::engine::SignalEngine;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SignalEngine>,
    pub store: Arc<ConfigStore>,
    pub settings: Arc<ServerConfig>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trendview=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Arc::new(ServerConfig::from_env());
    info!(
        "Starting TrendView server on {}:{}",
        settings.host, settings.port
    );

    let provider = Arc::new(YahooProvider::new());
    let cache = HistoryCache::new(&settings.data_dir, provider.clone());
    let intraday = IntradayFetcher::new(provider);
    let clock = MarketClock::new(Arc::new(NyseCalendar::new()));
    let engine = Arc::new(SignalEngine::new(cache, intraday, clock));

    let store = Arc::new(ConfigStore::new(&settings.hyperparams_path));

    let state = AppState {
        engine,
        store,
        settings: settings.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("TrendView server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
