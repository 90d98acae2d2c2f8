//! marketpulse: indicator computation and stateful price alerting for a
//! watchlist of crypto and stock assets.
//!
//! Each polling tick, candles from an external feed flow through a bounded
//! [`store::CandleStore`], the pure indicator functions in [`indicators`],
//! and the vote-based [`signal`] aggregator, before the
//! [`alerts::AlertMachine`] decides, with memory of past decisions, which
//! alerts actually fire. Per-asset state survives restarts through a JSON
//! repository ([`alerts::state`]).
//!
//! Transport (price fetching, alert delivery) stays behind the
//! [`monitor::PriceFeed`] and [`monitor::AlertNotifier`] traits.

pub mod alerts;
pub mod config;
pub mod error;
pub mod indicators;
pub mod monitor;
pub mod signal;
pub mod store;

pub use alerts::{AlertMachine, AlertRecord, AlertType, MonitoringState, Severity};
pub use config::{AssetConfig, AssetType, MonitorConfig};
pub use error::MonitorError;
pub use indicators::candle::Candle;
pub use indicators::snapshot::{IndicatorKind, IndicatorSnapshot};
pub use monitor::{AlertNotifier, Monitor, PriceFeed, TickReport};
pub use signal::{CompositeSignal, Sentiment, Signal};
pub use store::CandleStore;
