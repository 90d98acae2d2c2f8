//! Persisted monitoring state
//!
//! One record per asset, read once at tick start and written once at tick
//! end. The JSON schema is forward-compatible: missing fields default,
//! unknown fields are ignored, and a corrupt per-asset entry resets only
//! that asset.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::MonitorError;

/// Direction of the last trend-deviation alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

/// Per-asset state carried across polling cycles.
///
/// Created on first observation of an asset; never deleted (an asset
/// removed from configuration leaves an inert record behind).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetMonitoringState {
    /// Rolling price history for the moving-average spike/trend check.
    /// Separate from the candle series; bounded by the asset's MA period.
    pub price_history: Vec<f64>,
    /// Reference price of the last spike alert.
    pub last_alert_price: Option<f64>,
    /// Price reported in the last periodic summary.
    pub last_report_price: Option<f64>,
    /// Whether the previous tick ended inside a trend deviation.
    pub was_in_deviation: bool,
    pub last_trend_alert_time: Option<DateTime<Utc>>,
    /// Reference price the trend channel re-bases on after each fire.
    pub last_trend_alert_price: Option<f64>,
    pub trend_alert_direction: Option<Direction>,
    /// First price observed on the current UTC day.
    pub opening_price: Option<f64>,
    pub opening_price_date: Option<NaiveDate>,
    pub total_alerts: u64,
}

impl AssetMonitoringState {
    /// Checks the record's internal invariants.
    pub fn is_valid(&self) -> bool {
        self.price_history.iter().all(|p| p.is_finite() && *p > 0.0)
            && check_price(self.last_alert_price)
            && check_price(self.last_report_price)
            && check_price(self.last_trend_alert_price)
            && check_price(self.opening_price)
    }

    /// Pushes a price into the rolling history, keeping at most `cap`
    /// entries.
    pub fn push_price(&mut self, price: f64, cap: usize) {
        self.price_history.push(price);
        let excess = self.price_history.len().saturating_sub(cap.max(2));
        if excess > 0 {
            self.price_history.drain(..excess);
        }
    }

    /// Rolls the opening-price bookkeeping over to a new UTC day.
    pub fn roll_opening_price(&mut self, price: f64, today: NaiveDate) {
        if self.opening_price_date != Some(today) {
            self.opening_price = Some(price);
            self.opening_price_date = Some(today);
        }
    }

    /// Change since the daily open, in percent.
    pub fn daily_change_pct(&self, price: f64) -> Option<f64> {
        let open = self.opening_price?;
        Some((price - open) / open * 100.0)
    }
}

fn check_price(price: Option<f64>) -> bool {
    price.is_none_or(|p| p.is_finite() && p > 0.0)
}

/// The full persisted blob: asset name -> state, plus global report time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringState {
    pub assets: HashMap<String, AssetMonitoringState>,
    pub last_periodic_report_time: Option<DateTime<Utc>>,
}

impl MonitoringState {
    /// Deserializes from JSON, recovering per asset.
    ///
    /// A record that fails to parse or violates its invariants is replaced
    /// with a fresh default for that asset only; the rest of the state
    /// loads normally. Unusable JSON yields an entirely fresh state.
    pub fn from_json(raw: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "monitoring state unreadable, starting fresh");
                return Self::default();
            }
        };

        let mut state = Self::default();
        state.last_periodic_report_time = value
            .get("last_periodic_report_time")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok());

        if let Some(assets) = value.get("assets").and_then(|v| v.as_object()) {
            for (name, entry) in assets {
                let parsed: AssetMonitoringState =
                    match serde_json::from_value(entry.clone()) {
                        Ok(parsed) => parsed,
                        Err(e) => {
                            warn!(asset = %name, error = %e, "resetting corrupt asset state");
                            AssetMonitoringState::default()
                        }
                    };
                let parsed = if parsed.is_valid() {
                    parsed
                } else {
                    warn!(asset = %name, "asset state violates invariants, resetting");
                    AssetMonitoringState::default()
                };
                state.assets.insert(name.clone(), parsed);
            }
        }

        state
    }

    pub fn to_json(&self) -> Result<String, MonitorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The state record for an asset, created on first use.
    pub fn asset_mut(&mut self, name: &str) -> &mut AssetMonitoringState {
        self.assets.entry(name.to_string()).or_default()
    }
}

/// Storage seam for the persisted state, so the JSON file can later be
/// swapped for a real store without touching the decision logic.
pub trait StateRepository {
    fn load(&self) -> Result<MonitoringState, MonitorError>;
    fn save(&self, state: &MonitoringState) -> Result<(), MonitorError>;
}

/// JSON-file-backed repository. A missing file is an empty state.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl StateRepository for JsonFileRepository {
    fn load(&self) -> Result<MonitoringState, MonitorError> {
        if !self.path.exists() {
            return Ok(MonitoringState::default());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(MonitoringState::from_json(&raw))
    }

    fn save(&self, state: &MonitoringState) -> Result<(), MonitorError> {
        std::fs::write(&self.path, state.to_json()?)?;
        Ok(())
    }
}

/// In-memory repository for tests and embedded use.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: std::sync::Mutex<MonitoringState>,
}

impl StateRepository for InMemoryRepository {
    fn load(&self) -> Result<MonitoringState, MonitorError> {
        Ok(self
            .state
            .lock()
            .expect("state mutex poisoned")
            .clone())
    }

    fn save(&self, state: &MonitoringState) -> Result<(), MonitorError> {
        *self.state.lock().expect("state mutex poisoned") = state.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut state = MonitoringState::default();
        let asset = state.asset_mut("BTC");
        asset.push_price(50_000.0, 20);
        asset.last_alert_price = Some(49_000.0);
        asset.trend_alert_direction = Some(Direction::Up);
        asset.total_alerts = 3;
        state.last_periodic_report_time = Some(Utc::now());

        let json = state.to_json().unwrap();
        let back = MonitoringState::from_json(&json);
        assert_eq!(state, back);
    }

    #[test]
    fn test_missing_fields_default() {
        let state = MonitoringState::from_json(r#"{"assets": {"BTC": {}}}"#);
        let asset = &state.assets["BTC"];
        assert!(asset.price_history.is_empty());
        assert_eq!(asset.last_alert_price, None);
        assert!(!asset.was_in_deviation);
        assert_eq!(asset.total_alerts, 0);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let state = MonitoringState::from_json(
            r#"{"assets": {"BTC": {"total_alerts": 5, "some_future_field": true}}}"#,
        );
        assert_eq!(state.assets["BTC"].total_alerts, 5);
    }

    #[test]
    fn test_corrupt_asset_resets_only_that_asset() {
        let state = MonitoringState::from_json(
            r#"{"assets": {
                "BTC": {"price_history": "not a list"},
                "ETH": {"total_alerts": 7}
            }}"#,
        );
        assert_eq!(state.assets["BTC"], AssetMonitoringState::default());
        assert_eq!(state.assets["ETH"].total_alerts, 7);
    }

    #[test]
    fn test_invariant_violation_resets_asset() {
        let state = MonitoringState::from_json(
            r#"{"assets": {"BTC": {"price_history": [100.0, -5.0]}}}"#,
        );
        assert_eq!(state.assets["BTC"], AssetMonitoringState::default());
    }

    #[test]
    fn test_garbage_json_starts_fresh() {
        let state = MonitoringState::from_json("{{{ not json");
        assert_eq!(state, MonitoringState::default());
    }

    #[test]
    fn test_push_price_bounded() {
        let mut asset = AssetMonitoringState::default();
        for i in 0..30 {
            asset.push_price(100.0 + i as f64, 10);
        }
        assert_eq!(asset.price_history.len(), 10);
        assert_eq!(asset.price_history[0], 120.0);
    }

    #[test]
    fn test_opening_price_rolls_once_per_day() {
        let mut asset = AssetMonitoringState::default();
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        asset.roll_opening_price(100.0, day);
        assert_eq!(asset.opening_price, Some(100.0));

        // Same day: opening price is pinned.
        asset.roll_opening_price(110.0, day);
        assert_eq!(asset.opening_price, Some(100.0));
        assert_eq!(asset.daily_change_pct(110.0), Some(10.0));

        // New day: rebased.
        let next = day.succ_opt().unwrap();
        asset.roll_opening_price(110.0, next);
        assert_eq!(asset.opening_price, Some(110.0));
    }

    #[test]
    fn test_file_repository_missing_file() {
        let repo = JsonFileRepository::new("/nonexistent/dir/state.json");
        assert_eq!(repo.load().unwrap(), MonitoringState::default());
    }

    #[test]
    fn test_file_repository_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let repo = JsonFileRepository::new(&path);

        let mut state = MonitoringState::default();
        state.asset_mut("BTC").total_alerts = 2;
        repo.save(&state).unwrap();

        assert_eq!(repo.load().unwrap(), state);
    }
}
