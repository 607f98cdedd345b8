//! User-tunable hyperparameters — JSON load/save with per-field defaults.
//!
//! The file is read fresh on every render and written only by the explicit
//! save operation. Missing or malformed values are never fatal; they fall
//! back field-by-field to the defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_ma_window() -> usize {
    200
}

fn default_threshold() -> f64 {
    0.01
}

fn default_months_show() -> u32 {
    18
}

/// Signal hyperparameters plus the default chart window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperParams {
    #[serde(rename = "MA_WINDOW", default = "default_ma_window")]
    pub ma_window: usize,
    #[serde(rename = "THRESHOLD", default = "default_threshold")]
    pub threshold: f64,
    #[serde(rename = "DEFAULT_MONTHS_SHOW", default = "default_months_show")]
    pub default_months_show: u32,
}

impl Default for HyperParams {
    fn default() -> Self {
        Self {
            ma_window: default_ma_window(),
            threshold: default_threshold(),
            default_months_show: default_months_show(),
        }
    }
}

/// Explicit load/save around the hyperparameters file; no implicit global
/// state. Every computation takes parameters as arguments, with defaults
/// resolved here at the call boundary.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load hyperparameters. Missing file, unreadable file, or invalid
    /// JSON all yield the defaults.
    pub fn load(&self) -> HyperParams {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => HyperParams::default(),
        }
    }

    /// Save hyperparameters, creating parent directories if needed.
    pub fn save(&self, params: &HyperParams) -> Result<(), std::io::Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(params)?;
        std::fs::write(&self.path, json)
    }
}
