//! TrendView CLI — download, signals, and config commands.
//!
//! Commands:
//! - `download` — fetch daily history from Yahoo Finance into the CSV cache
//! - `signals` — print the signal table for a symbol (cached fallback
//!   permitted, so it works while the market is closed)
//! - `config` — show or save the persisted hyperparameters

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use trendview_core::calendar::{MarketClock, NyseCalendar};
use trendview_core::config::{ConfigStore, HyperParams};
use trendview_core::data::{HistoryCache, IntradayFetcher, YahooProvider};
use trendview_core::engine::{ChartRequest, SignalEngine};

#[derive(Parser)]
#[command(name = "trendview", about = "TrendView CLI — SMA trend-signal pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download daily history from Yahoo Finance into the CSV cache.
    Download {
        /// Symbols to download (e.g., ^GSPC SPY).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Re-fetch even if the cached copy is fresh.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Cache directory.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// Print the signal table for a symbol.
    Signals {
        /// Symbol to compute signals for.
        symbol: String,

        /// Moving-average window in days. Defaults to the persisted value.
        #[arg(long)]
        ma_window: Option<usize>,

        /// Band threshold as a fraction. Defaults to the persisted value.
        #[arg(long)]
        threshold: Option<f64>,

        /// How many trailing rows to print.
        #[arg(long, default_value_t = 20)]
        last: usize,

        /// Cache directory.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Hyperparameters file.
        #[arg(long, default_value = "hyperparams.json")]
        hyperparams: PathBuf,
    },
    /// Show or save the persisted hyperparameters.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current hyperparameters.
    Show {
        #[arg(long, default_value = "hyperparams.json")]
        hyperparams: PathBuf,
    },
    /// Save hyperparameters to the config file.
    Save {
        #[arg(long)]
        ma_window: usize,

        #[arg(long)]
        threshold: f64,

        #[arg(long)]
        months_show: Option<u32>,

        #[arg(long, default_value = "hyperparams.json")]
        hyperparams: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trendview=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Download {
            symbols,
            force,
            data_dir,
        } => download(&symbols, force, data_dir),
        Commands::Signals {
            symbol,
            ma_window,
            threshold,
            last,
            data_dir,
            hyperparams,
        } => signals(&symbol, ma_window, threshold, last, data_dir, hyperparams),
        Commands::Config { action } => config(action),
    }
}

fn download(symbols: &[String], force: bool, data_dir: PathBuf) -> Result<()> {
    let provider = Arc::new(YahooProvider::new());
    let cache = HistoryCache::new(data_dir, provider);
    let clock = MarketClock::new(Arc::new(NyseCalendar::new()));
    let today = clock.local_date(Utc::now());

    let total = symbols.len();
    let mut failed = 0;
    for (i, symbol) in symbols.iter().enumerate() {
        println!("[{}/{}] Fetching {symbol}...", i + 1, total);
        let result = if force {
            cache.refresh(symbol)
        } else {
            cache.get_daily_history(symbol, today)
        };
        match result {
            Ok(series) => println!(
                "  OK: {symbol} — {} bars through {}",
                series.len(),
                series.last_date().map(|d| d.to_string()).unwrap_or_default()
            ),
            Err(e) => {
                println!("  FAIL: {symbol}: {e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed}/{total} downloads failed");
    }
    Ok(())
}

fn signals(
    symbol: &str,
    ma_window: Option<usize>,
    threshold: Option<f64>,
    last: usize,
    data_dir: PathBuf,
    hyperparams: PathBuf,
) -> Result<()> {
    let store = ConfigStore::new(hyperparams);
    let defaults = store.load();

    if let Some(w) = ma_window {
        if w < 1 {
            bail!("--ma-window must be >= 1");
        }
    }
    if let Some(t) = threshold {
        if t < 0.0 {
            bail!("--threshold must be non-negative");
        }
    }

    let provider = Arc::new(YahooProvider::new());
    let cache = HistoryCache::new(data_dir, provider.clone());
    let intraday = IntradayFetcher::new(provider);
    let clock = MarketClock::new(Arc::new(NyseCalendar::new()));
    let engine = SignalEngine::new(cache, intraday, clock);

    let request = ChartRequest {
        symbol: symbol.to_string(),
        intraday_symbol: None,
        ma_window: ma_window.unwrap_or(defaults.ma_window),
        threshold: threshold.unwrap_or(defaults.threshold),
        overwrite: None,
    };

    let data = engine.build_chart_data_auto(&request, Utc::now())?;

    if let Some(warning) = &data.warning {
        println!("WARNING: {warning}");
    }
    println!(
        "{} rows ({} source){}",
        data.rows.len(),
        if data.live { "live" } else { "cached" },
        if data.rows.len() > last {
            format!(", showing last {last}")
        } else {
            String::new()
        }
    );
    println!(
        "{:<12} {:>12} {:>12} {:>12} {:>12}  {}",
        "date", "adj_close", "sma", "upper", "lower", "signal"
    );
    let start = data.rows.len().saturating_sub(last);
    for row in &data.rows[start..] {
        println!(
            "{:<12} {:>12.2} {:>12.2} {:>12.2} {:>12.2}  {}",
            row.date.to_string(),
            row.adj_close,
            row.sma,
            row.upper_band,
            row.lower_band,
            match row.signal {
                Some(s) => format!("{s:?}").to_uppercase(),
                None => String::new(),
            }
        );
    }
    Ok(())
}

fn config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show { hyperparams } => {
            let store = ConfigStore::new(hyperparams);
            let params = store.load();
            println!("MA_WINDOW          = {}", params.ma_window);
            println!("THRESHOLD          = {}", params.threshold);
            println!("DEFAULT_MONTHS_SHOW = {}", params.default_months_show);
        }
        ConfigAction::Save {
            ma_window,
            threshold,
            months_show,
            hyperparams,
        } => {
            if ma_window < 1 {
                bail!("--ma-window must be >= 1");
            }
            if threshold < 0.0 {
                bail!("--threshold must be non-negative");
            }
            let store = ConfigStore::new(&hyperparams);
            let current = store.load();
            let params = HyperParams {
                ma_window,
                threshold,
                default_months_show: months_show.unwrap_or(current.default_months_show),
            };
            store.save(&params)?;
            println!("Saved {}", hyperparams.display());
        }
    }
    Ok(())
}
