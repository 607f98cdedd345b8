//! Server configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Bind address, data paths, and the default symbol pair.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the per-symbol CSV cache.
    pub data_dir: PathBuf,
    /// Path of the hyperparameters JSON file.
    pub hyperparams_path: PathBuf,
    /// Symbol charted when the request does not name one.
    pub symbol: String,
    /// Distinct symbol for the intraday quote, if any.
    pub intraday_symbol: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8050),
            data_dir: env::var("TRENDVIEW_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            hyperparams_path: env::var("TRENDVIEW_HYPERPARAMS")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("hyperparams.json")),
            symbol: env::var("TRENDVIEW_SYMBOL").unwrap_or_else(|_| "^GSPC".to_string()),
            intraday_symbol: env::var("TRENDVIEW_INTRADAY_SYMBOL").ok(),
        }
    }
}
