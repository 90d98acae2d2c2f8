//! Structured alert records handed to the external notifier

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::indicators::snapshot::IndicatorKind;

/// What triggered an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    /// Point-to-point price move past the spike threshold.
    PriceSpike,
    /// Price deviating from its moving average past the trend threshold.
    TrendDeviation,
    /// An indicator family produced a non-neutral signal.
    Indicator(IndicatorKind),
    /// Scheduled summary, not tied to a threshold crossing.
    PeriodicReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// One fired alert. Ephemeral: constructed, delivered, then discarded
/// (apart from the bounded introspection ring).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub alert_type: AlertType,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    /// Structured payload for the notifier; the core never formats beyond
    /// this.
    pub data: serde_json::Value,
    pub timestamp_utc: DateTime<Utc>,
}

impl AlertRecord {
    pub fn new(
        alert_type: AlertType,
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
        data: serde_json::Value,
        timestamp_utc: DateTime<Utc>,
    ) -> Self {
        Self {
            alert_type,
            severity,
            title: title.into(),
            message: message.into(),
            data,
            timestamp_utc,
        }
    }
}

/// Bounded ring of recently fired alerts, kept for introspection only.
/// Nothing in the decision logic reads it.
#[derive(Debug, Clone, Default)]
pub struct AlertHistory {
    ring: VecDeque<AlertRecord>,
    capacity: usize,
}

impl AlertHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, record: AlertRecord) {
        if self.capacity == 0 {
            return;
        }
        if self.ring.len() == self.capacity {
            self.ring.pop_front();
        }
        self.ring.push_back(record);
    }

    pub fn iter(&self) -> impl Iterator<Item = &AlertRecord> {
        self.ring.iter()
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}
