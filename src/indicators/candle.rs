//! Candle (OHLCV) data structure with timestamp

use serde::{Deserialize, Serialize};

/// Represents a single candlestick with OHLCV data and timestamp.
///
/// The timestamp is stored as Unix time in milliseconds, which is the format
/// used by most price feed APIs (exchanges, stock quote endpoints).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Unix timestamp in milliseconds (candle open time)
    timestamp: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl Candle {
    /// Creates a new Candle.
    ///
    /// `timestamp` should be Unix time in milliseconds (candle open time).
    /// Use `0` for the timestamp if not available (e.g., in tests).
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns the candle's timestamp (Unix time in milliseconds).
    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_open(&self) -> f64 {
        self.open
    }

    pub fn get_high(&self) -> f64 {
        self.high
    }

    pub fn get_low(&self) -> f64 {
        self.low
    }

    pub fn get_close(&self) -> f64 {
        self.close
    }

    pub fn get_volume(&self) -> f64 {
        self.volume
    }

    /// Midpoint of high and low.
    pub fn hl2(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// Typical price: average of high, low and close.
    ///
    /// Used by CCI, VWAP and other volume-weighted calculations.
    pub fn hlc3(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Average of all four price components.
    pub fn ohlc4(&self) -> f64 {
        (self.open + self.high + self.low + self.close) / 4.0
    }

    /// Returns the full range of the candle (high - low).
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Returns true if this is a green candle (close > open).
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Returns true if this is a red candle (close < open).
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Checks that every numeric field is finite, prices are positive and
    /// volume is non-negative.
    ///
    /// A candle failing this check is dropped at ingestion rather than
    /// poisoning downstream calculations with NaN/Infinity.
    pub fn is_well_formed(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        prices.iter().all(|p| p.is_finite() && *p > 0.0)
            && self.volume.is_finite()
            && self.volume >= 0.0
            && self.high >= self.low
    }
}
