//! Point-in-time bundle of every computed indicator

use crate::indicators::candle::Candle;
use crate::indicators::momentum::{self, Stochastic};
use crate::indicators::trend::{self, Fibonacci, Ichimoku, Macd};
use crate::indicators::volatility::{self, Bollinger};
use crate::indicators::volume::{self, Obv, Vwap};

use serde::{Deserialize, Serialize};

/// Identifies an indicator family, for signal attribution and per-family
/// alert cooldowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorKind {
    Rsi,
    Macd,
    Bollinger,
    Stochastic,
    Ichimoku,
    WilliamsR,
    Cci,
    Obv,
    Vwap,
    Fibonacci,
}

impl IndicatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Rsi => "rsi",
            IndicatorKind::Macd => "macd",
            IndicatorKind::Bollinger => "bollinger",
            IndicatorKind::Stochastic => "stochastic",
            IndicatorKind::Ichimoku => "ichimoku",
            IndicatorKind::WilliamsR => "williams_r",
            IndicatorKind::Cci => "cci",
            IndicatorKind::Obv => "obv",
            IndicatorKind::Vwap => "vwap",
            IndicatorKind::Fibonacci => "fibonacci",
        }
    }
}

/// All indicator values computed from one candle series snapshot.
///
/// Each field is `None` when the series is shorter than that indicator's
/// minimum period. A `None` field is a distinct third state: it is excluded
/// from signal aggregation rather than counted as neutral.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorSnapshot {
    /// Close of the most recent candle, if any.
    pub close: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<Macd>,
    pub bollinger: Option<Bollinger>,
    pub stochastic: Option<Stochastic>,
    pub ichimoku: Option<Ichimoku>,
    pub williams_r: Option<f64>,
    pub cci: Option<f64>,
    pub obv: Option<Obv>,
    pub vwap: Option<Vwap>,
    pub fibonacci: Option<Fibonacci>,
}

impl IndicatorSnapshot {
    /// Computes every indicator with its default parameters.
    ///
    /// Pure function of the candle slice: calling it twice on the same
    /// slice yields identical results.
    pub fn compute(candles: &[Candle]) -> Self {
        Self {
            close: candles.last().map(|c| c.get_close()),
            rsi: momentum::rsi(candles, None),
            macd: trend::macd(candles, None, None, None),
            bollinger: volatility::bollinger(candles, None, None),
            stochastic: momentum::stochastic(candles, None, None),
            ichimoku: trend::ichimoku(candles),
            williams_r: momentum::williams_r(candles, None),
            cci: momentum::cci(candles, None),
            obv: volume::obv(candles),
            vwap: volume::vwap(candles, None),
            fibonacci: trend::fibonacci(candles, None),
        }
    }
}
