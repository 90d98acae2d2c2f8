//! Tick driver: wires feed, stores, indicators, alert machine and state
//!
//! One logical tick per scheduled interval. Assets are processed
//! sequentially; one asset's failure never blocks the others. The persisted
//! state is read once at tick start and written once at tick end, so an
//! interrupted tick can never leave a half-written state behind.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::alerts::machine::AlertMachine;
use crate::alerts::record::{AlertRecord, AlertType, Severity};
use crate::alerts::state::{MonitoringState, StateRepository};
use crate::config::{AssetConfig, MonitorConfig};
use crate::error::MonitorError;
use crate::indicators::candle::Candle;
use crate::indicators::snapshot::IndicatorSnapshot;
use crate::signal::sentiment_of;
use crate::store::CandleStore;

/// Supplies candles for an asset at each tick. Network transport lives
/// behind this seam; a failed poll is an error here, zero candles is a
/// valid "no new data" answer.
pub trait PriceFeed {
    fn fetch(
        &self,
        asset: &AssetConfig,
    ) -> impl Future<Output = anyhow::Result<Vec<Candle>>> + Send;
}

/// Delivers fired alerts. Delivery failures are logged and dropped; the
/// core never retries.
pub trait AlertNotifier {
    fn notify(&self, record: &AlertRecord) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Outcome of one tick.
#[derive(Debug, Default)]
pub struct TickReport {
    pub assets_processed: usize,
    pub assets_failed: usize,
    pub alerts: Vec<AlertRecord>,
}

/// The polling monitor. Owns the candle stores and the alert machine;
/// persists per-asset monitoring state through the repository.
pub struct Monitor<F, N, R> {
    config: MonitorConfig,
    feed: F,
    notifier: N,
    repository: R,
    stores: HashMap<String, CandleStore>,
    machine: AlertMachine,
}

impl<F, N, R> Monitor<F, N, R>
where
    F: PriceFeed,
    N: AlertNotifier,
    R: StateRepository,
{
    pub fn new(config: MonitorConfig, feed: F, notifier: N, repository: R) -> Self {
        let machine = AlertMachine::new(
            Duration::hours(config.indicator_cooldown_hours),
            config.alert_history,
        );
        Self {
            config,
            feed,
            notifier,
            repository,
            stores: HashMap::new(),
            machine,
        }
    }

    pub fn machine(&self) -> &AlertMachine {
        &self.machine
    }

    /// Runs ticks forever at the given interval.
    pub async fn run(&mut self, interval: std::time::Duration) -> ! {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.tick(Utc::now()).await {
                Ok(report) => {
                    debug!(
                        processed = report.assets_processed,
                        failed = report.assets_failed,
                        alerts = report.alerts.len(),
                        "tick complete"
                    );
                }
                Err(e) => error!(error = %e, "tick failed"),
            }
        }
    }

    /// Executes one polling tick.
    ///
    /// Only state persistence can fail the whole tick; per-asset feed
    /// errors are contained.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<TickReport, MonitorError> {
        let mut state = self.repository.load()?;
        let mut report = TickReport::default();

        for asset in self.config.enabled_assets() {
            let candles = match self.feed.fetch(asset).await {
                Ok(candles) => candles,
                Err(e) => {
                    warn!(asset = %asset.name, error = %e, "price fetch failed, skipping");
                    report.assets_failed += 1;
                    continue;
                }
            };

            let store = self
                .stores
                .entry(asset.name.clone())
                .or_insert_with(|| CandleStore::new(self.config.candle_capacity));
            let accepted = store.extend(candles);
            debug!(asset = %asset.name, accepted, total = store.len(), "candles ingested");

            let Some(price) = store.last().map(|c| c.get_close()) else {
                // Nothing observed yet for this asset; cold start.
                report.assets_processed += 1;
                continue;
            };

            let snapshot = IndicatorSnapshot::compute(&store.all());
            let sentiment = sentiment_of(&snapshot);

            let asset_state = state.asset_mut(&asset.name);
            if !asset_state.is_valid() {
                warn!(asset = %asset.name, "monitoring state invalid, reinitializing");
                *asset_state = Default::default();
            }

            report
                .alerts
                .extend(self.machine.evaluate_price(asset, asset_state, price, now));
            let indicator_alerts =
                self.machine
                    .evaluate_indicators(&asset.name, &snapshot, &sentiment, now);
            asset_state.total_alerts += indicator_alerts.len() as u64;
            report.alerts.extend(indicator_alerts);
            report.assets_processed += 1;
        }

        self.maybe_periodic_report(&mut state, now, &mut report);

        for alert in &report.alerts {
            if let Err(e) = self.notifier.notify(alert).await {
                warn!(title = %alert.title, error = %e, "alert delivery failed");
            }
        }

        self.repository.save(&state)?;
        if !report.alerts.is_empty() {
            info!(alerts = report.alerts.len(), "tick fired alerts");
        }
        Ok(report)
    }

    /// Emits a summary record per asset when the report interval elapses.
    ///
    /// The first tick only arms the timer, so a fresh deployment does not
    /// open with an empty report.
    fn maybe_periodic_report(
        &self,
        state: &mut MonitoringState,
        now: DateTime<Utc>,
        report: &mut TickReport,
    ) {
        if self.config.report_interval_hours <= 0 {
            return;
        }
        let Some(last) = state.last_periodic_report_time else {
            state.last_periodic_report_time = Some(now);
            return;
        };
        if now - last < Duration::hours(self.config.report_interval_hours) {
            return;
        }

        for asset in self.config.enabled_assets() {
            let Some(price) = self
                .stores
                .get(&asset.name)
                .and_then(|s| s.last())
                .map(|c| c.get_close())
            else {
                continue;
            };
            let asset_state = state.asset_mut(&asset.name);
            let change_pct = asset_state
                .last_report_price
                .map(|prev| (price - prev) / prev * 100.0);

            report.alerts.push(AlertRecord::new(
                AlertType::PeriodicReport,
                Severity::Info,
                format!("{} periodic summary", asset.name),
                match change_pct {
                    Some(change) => format!(
                        "{} at {:.4} ({:+.2}% since last report)",
                        asset.name, price, change
                    ),
                    None => format!("{} at {:.4} (first report)", asset.name, price),
                },
                json!({
                    "asset": asset.name,
                    "price": price,
                    "change_pct": change_pct,
                    "daily_change_pct": asset_state.daily_change_pct(price),
                    "total_alerts": asset_state.total_alerts,
                }),
                now,
            ));
            asset_state.last_report_price = Some(price);
        }
        state.last_periodic_report_time = Some(now);
    }
}
