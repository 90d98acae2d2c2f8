//! Per-asset alert decision logic
//!
//! Two independent price channels plus indicator-family alerts:
//!
//! - **Spike**: point-to-point move past the threshold. No hysteresis; a
//!   spike is a distinct event and fires on every tick where it holds.
//! - **Trend deviation**: price vs. its moving average, with re-alert
//!   suppression. After a fire the reference price is hard-reset to the
//!   current price, so the next same-direction alert needs a full fresh
//!   threshold-distance of movement. A direction reversal always fires.
//! - **Indicator**: one alert per indicator family, gated by a time
//!   cooldown and by last-value-equality (the same discrete signal never
//!   refires until it changes).

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::debug;

use crate::alerts::record::{AlertHistory, AlertRecord, AlertType, Severity};
use crate::alerts::state::{AssetMonitoringState, Direction};
use crate::config::AssetConfig;
use crate::indicators::snapshot::{IndicatorKind, IndicatorSnapshot};
use crate::signal::{Signal, Sentiment, indicator_signals};

/// Stateful alert machine. Owns the indicator-family gate and the
/// introspection ring; the per-asset price-channel state lives in the
/// persisted [`AssetMonitoringState`] passed into each call.
#[derive(Debug)]
pub struct AlertMachine {
    indicator_cooldown: Duration,
    /// (asset, family) -> last fired time and signal.
    indicator_gate: HashMap<(String, IndicatorKind), (DateTime<Utc>, Signal)>,
    history: AlertHistory,
}

impl AlertMachine {
    pub fn new(indicator_cooldown: Duration, history_capacity: usize) -> Self {
        Self {
            indicator_cooldown,
            indicator_gate: HashMap::new(),
            history: AlertHistory::new(history_capacity),
        }
    }

    /// Recently fired alerts (introspection only).
    pub fn recent_alerts(&self) -> impl Iterator<Item = &AlertRecord> {
        self.history.iter()
    }

    /// Runs both price channels for one asset and updates its state.
    ///
    /// The read-decide-write cycle for the asset happens entirely within
    /// this call. With fewer than two history points and no recorded spike
    /// reference this is a cold start: no comparison, no alert.
    pub fn evaluate_price(
        &mut self,
        config: &AssetConfig,
        state: &mut AssetMonitoringState,
        price: f64,
        now: DateTime<Utc>,
    ) -> Vec<AlertRecord> {
        let mut fired = Vec::new();

        state.roll_opening_price(price, now.date_naive());
        state.push_price(price, config.ma_period);

        if let Some(alert) = self.check_spike(config, state, price, now) {
            fired.push(alert);
        }
        if let Some(alert) = self.check_trend(config, state, price, now) {
            fired.push(alert);
        }

        state.total_alerts += fired.len() as u64;
        for alert in &fired {
            self.history.push(alert.clone());
        }
        fired
    }

    /// Spike channel: current price vs. the immediately preceding sample
    /// (falling back to the last spike reference when history is short).
    fn check_spike(
        &self,
        config: &AssetConfig,
        state: &mut AssetMonitoringState,
        price: f64,
        now: DateTime<Utc>,
    ) -> Option<AlertRecord> {
        let history = &state.price_history;
        let reference = if history.len() >= 2 {
            Some(history[history.len() - 2])
        } else {
            state.last_alert_price
        }?;

        let change_pct = (price - reference) / reference * 100.0;
        if change_pct.abs() < config.spike_threshold {
            return None;
        }

        state.last_alert_price = Some(price);
        debug!(asset = %config.name, change_pct, "price spike");

        let severity = if change_pct.abs() >= config.spike_threshold * 2.0 {
            Severity::Critical
        } else {
            Severity::Warning
        };
        let direction = if change_pct > 0.0 { "up" } else { "down" };
        Some(AlertRecord::new(
            AlertType::PriceSpike,
            severity,
            format!("{} price spike {}", config.name, direction),
            format!(
                "{} moved {:+.2}% (from {:.4} to {:.4})",
                config.name, change_pct, reference, price
            ),
            json!({
                "asset": config.name,
                "price": price,
                "reference": reference,
                "change_pct": change_pct,
                "daily_change_pct": state.daily_change_pct(price),
            }),
            now,
        ))
    }

    /// Trend channel: deviation from the moving average, with
    /// reference-price-rebasing hysteresis.
    fn check_trend(
        &self,
        config: &AssetConfig,
        state: &mut AssetMonitoringState,
        price: f64,
        now: DateTime<Utc>,
    ) -> Option<AlertRecord> {
        let history = &state.price_history;
        if history.len() < 2 {
            return None;
        }

        let window = history.len().min(config.ma_period);
        let ma = history[history.len() - window..].iter().sum::<f64>() / window as f64;
        let deviation_pct = (price - ma) / ma * 100.0;

        if deviation_pct.abs() < config.trend_threshold {
            state.was_in_deviation = false;
            return None;
        }

        let direction = if deviation_pct > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        };

        let fire = match state.last_trend_alert_price {
            // First trend alert ever recorded for this asset.
            None => true,
            Some(reference) => {
                if state.trend_alert_direction != Some(direction) {
                    // A reversal re-alerts regardless of distance.
                    true
                } else {
                    // Same direction: require a full fresh threshold-distance
                    // from the last alert's reference price.
                    (price - reference).abs() / reference * 100.0 >= config.trend_threshold
                }
            }
        };

        state.was_in_deviation = true;
        if !fire {
            return None;
        }

        // Hard reset: the next trigger distance is measured from here.
        state.last_trend_alert_price = Some(price);
        state.trend_alert_direction = Some(direction);
        state.last_trend_alert_time = Some(now);
        debug!(asset = %config.name, deviation_pct, ?direction, "trend deviation");

        let label = match direction {
            Direction::Up => "above",
            Direction::Down => "below",
        };
        Some(AlertRecord::new(
            AlertType::TrendDeviation,
            Severity::Warning,
            format!("{} trending {} its average", config.name, label),
            format!(
                "{} is {:+.2}% vs its {}-sample moving average ({:.4})",
                config.name, deviation_pct, window, ma
            ),
            json!({
                "asset": config.name,
                "price": price,
                "moving_average": ma,
                "deviation_pct": deviation_pct,
                "direction": direction,
                "daily_change_pct": state.daily_change_pct(price),
            }),
            now,
        ))
    }

    /// Indicator-family alerts for one asset.
    ///
    /// A family fires on a non-neutral signal, at most once per cooldown,
    /// and never for the same signal value it last fired with.
    pub fn evaluate_indicators(
        &mut self,
        asset: &str,
        snapshot: &IndicatorSnapshot,
        sentiment: &Sentiment,
        now: DateTime<Utc>,
    ) -> Vec<AlertRecord> {
        let mut fired = Vec::new();

        for (kind, signal) in indicator_signals(snapshot) {
            if signal == Signal::Neutral {
                continue;
            }
            let key = (asset.to_string(), kind);
            if let Some((last_time, last_signal)) = self.indicator_gate.get(&key) {
                if *last_signal == signal {
                    continue;
                }
                if now - *last_time < self.indicator_cooldown {
                    continue;
                }
            }

            self.indicator_gate.insert(key, (now, signal));
            debug!(asset, kind = kind.as_str(), ?signal, "indicator alert");
            fired.push(AlertRecord::new(
                AlertType::Indicator(kind),
                Severity::Info,
                format!("{} {} signal: {:?}", asset, kind.as_str(), signal),
                format!(
                    "{}: {} reads {:?}; composite sentiment {} ({} bullish / {} bearish of {})",
                    asset,
                    kind.as_str(),
                    signal,
                    sentiment.composite.as_str(),
                    sentiment.bullish,
                    sentiment.bearish,
                    sentiment.active
                ),
                json!({
                    "asset": asset,
                    "indicator": kind.as_str(),
                    "signal": signal,
                    "composite": sentiment.composite.as_str(),
                }),
                now,
            ));
        }

        for alert in &fired {
            self.history.push(alert.clone());
        }
        fired
    }
}
