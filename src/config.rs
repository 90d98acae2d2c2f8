//! Monitor configuration
//!
//! Configuration is an explicit struct passed by reference into the tick
//! driver; there are no process-wide mutable singletons.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// Kind of asset being watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    #[default]
    Crypto,
    Stock,
}

/// Per-asset watch configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetConfig {
    pub name: String,
    #[serde(rename = "type", default)]
    pub asset_type: AssetType,
    /// Point-to-point move (percent) that fires a spike alert.
    #[serde(default = "default_spike_threshold")]
    pub spike_threshold: f64,
    /// Deviation from the moving average (percent) that arms the trend channel.
    #[serde(default = "default_trend_threshold")]
    pub trend_threshold: f64,
    /// Moving-average window for the trend-deviation check.
    #[serde(default = "default_ma_period")]
    pub ma_period: usize,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl AssetConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asset_type: AssetType::Crypto,
            spike_threshold: default_spike_threshold(),
            trend_threshold: default_trend_threshold(),
            ma_period: default_ma_period(),
            enabled: true,
        }
    }
}

fn default_spike_threshold() -> f64 {
    2.0
}

fn default_trend_threshold() -> f64 {
    2.0
}

fn default_ma_period() -> usize {
    20
}

fn default_enabled() -> bool {
    true
}

/// Top-level monitor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub assets: Vec<AssetConfig>,
    /// Candle history retained per asset.
    #[serde(default = "default_candle_capacity")]
    pub candle_capacity: usize,
    /// Minimum hours between alerts of the same indicator family per asset.
    #[serde(default = "default_indicator_cooldown_hours")]
    pub indicator_cooldown_hours: i64,
    /// Hours between periodic summary reports (0 disables them).
    #[serde(default = "default_report_interval_hours")]
    pub report_interval_hours: i64,
    /// Fired alerts retained for introspection.
    #[serde(default = "default_alert_history")]
    pub alert_history: usize,
}

fn default_candle_capacity() -> usize {
    300
}

fn default_indicator_cooldown_hours() -> i64 {
    4
}

fn default_report_interval_hours() -> i64 {
    24
}

fn default_alert_history() -> usize {
    100
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            assets: Vec::new(),
            candle_capacity: default_candle_capacity(),
            indicator_cooldown_hours: default_indicator_cooldown_hours(),
            report_interval_hours: default_report_interval_hours(),
            alert_history: default_alert_history(),
        }
    }
}

impl MonitorConfig {
    /// Loads configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MonitorError> {
        let raw = std::fs::read_to_string(path)?;
        let config: MonitorConfig = serde_json::from_str(&raw)
            .map_err(|e| MonitorError::Config(format!("invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        for asset in &self.assets {
            if asset.name.is_empty() {
                return Err(MonitorError::Config("asset name must not be empty".into()));
            }
            if asset.spike_threshold <= 0.0 || asset.trend_threshold <= 0.0 {
                return Err(MonitorError::Config(format!(
                    "{}: thresholds must be positive",
                    asset.name
                )));
            }
            if asset.ma_period < 2 {
                return Err(MonitorError::Config(format!(
                    "{}: ma_period must be at least 2",
                    asset.name
                )));
            }
        }
        Ok(())
    }

    /// Enabled assets only, in configuration order.
    pub fn enabled_assets(&self) -> impl Iterator<Item = &AssetConfig> {
        self.assets.iter().filter(|a| a.enabled)
    }
}
