//! Per-indicator discrete signals and the composite sentiment

use serde::{Deserialize, Serialize};

use crate::indicators::Crossover;
use crate::indicators::snapshot::{IndicatorKind, IndicatorSnapshot};
use crate::indicators::volume::Trend;

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;
pub const STOCH_OVERBOUGHT: f64 = 80.0;
pub const STOCH_OVERSOLD: f64 = 20.0;
pub const WILLIAMS_OVERBOUGHT: f64 = -20.0;
pub const WILLIAMS_OVERSOLD: f64 = -80.0;
pub const CCI_OVERBOUGHT: f64 = 100.0;
pub const CCI_OVERSOLD: f64 = -100.0;

/// Discrete directional reading of one indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Bullish,
    Bearish,
    Neutral,
}

/// Tiered composite sentiment across all active indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompositeSignal {
    VeryStrongBullish,
    StrongBullish,
    Bullish,
    Neutral,
    Bearish,
    StrongBearish,
    VeryStrongBearish,
}

impl CompositeSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositeSignal::VeryStrongBullish => "very_strong_bullish",
            CompositeSignal::StrongBullish => "strong_bullish",
            CompositeSignal::Bullish => "bullish",
            CompositeSignal::Neutral => "neutral",
            CompositeSignal::Bearish => "bearish",
            CompositeSignal::StrongBearish => "strong_bearish",
            CompositeSignal::VeryStrongBearish => "very_strong_bearish",
        }
    }
}

/// Composite result with the vote counts that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub composite: CompositeSignal,
    pub bullish: usize,
    pub bearish: usize,
    pub neutral: usize,
    /// Indicators that voted (insufficient-data indicators are excluded,
    /// which shrinks the denominator rather than diluting it).
    pub active: usize,
}

/// Derives the discrete signal of every indicator that had enough data.
///
/// Oscillators (RSI, Stochastic, Williams %R, CCI, Bollinger position) are
/// read mean-reverting: overbought votes bearish, oversold votes bullish.
/// Trend indicators (MACD, Ichimoku, OBV, VWAP, Fibonacci position) are
/// read trend-following.
pub fn indicator_signals(snapshot: &IndicatorSnapshot) -> Vec<(IndicatorKind, Signal)> {
    let mut signals = Vec::new();

    if let Some(rsi) = snapshot.rsi {
        let signal = if rsi >= RSI_OVERBOUGHT {
            Signal::Bearish
        } else if rsi <= RSI_OVERSOLD {
            Signal::Bullish
        } else {
            Signal::Neutral
        };
        signals.push((IndicatorKind::Rsi, signal));
    }

    if let Some(macd) = snapshot.macd {
        let signal = match macd.crossover {
            Some(Crossover::Golden) => Signal::Bullish,
            Some(Crossover::Dead) => Signal::Bearish,
            None => {
                if macd.histogram > 0.0 {
                    Signal::Bullish
                } else if macd.histogram < 0.0 {
                    Signal::Bearish
                } else {
                    Signal::Neutral
                }
            }
        };
        signals.push((IndicatorKind::Macd, signal));
    }

    if let (Some(bollinger), Some(close)) = (snapshot.bollinger, snapshot.close) {
        let signal = if close > bollinger.upper {
            Signal::Bearish
        } else if close < bollinger.lower {
            Signal::Bullish
        } else {
            Signal::Neutral
        };
        signals.push((IndicatorKind::Bollinger, signal));
    }

    if let Some(stochastic) = snapshot.stochastic {
        let signal = match stochastic.crossover {
            Some(Crossover::Golden) => Signal::Bullish,
            Some(Crossover::Dead) => Signal::Bearish,
            None => {
                if stochastic.k >= STOCH_OVERBOUGHT {
                    Signal::Bearish
                } else if stochastic.k <= STOCH_OVERSOLD {
                    Signal::Bullish
                } else {
                    Signal::Neutral
                }
            }
        };
        signals.push((IndicatorKind::Stochastic, signal));
    }

    if let (Some(ichimoku), Some(close)) = (snapshot.ichimoku, snapshot.close) {
        let signal = if close > ichimoku.cloud_top() {
            Signal::Bullish
        } else if close < ichimoku.cloud_bottom() {
            Signal::Bearish
        } else {
            Signal::Neutral
        };
        signals.push((IndicatorKind::Ichimoku, signal));
    }

    if let Some(williams) = snapshot.williams_r {
        let signal = if williams >= WILLIAMS_OVERBOUGHT {
            Signal::Bearish
        } else if williams <= WILLIAMS_OVERSOLD {
            Signal::Bullish
        } else {
            Signal::Neutral
        };
        signals.push((IndicatorKind::WilliamsR, signal));
    }

    if let Some(cci) = snapshot.cci {
        let signal = if cci >= CCI_OVERBOUGHT {
            Signal::Bearish
        } else if cci <= CCI_OVERSOLD {
            Signal::Bullish
        } else {
            Signal::Neutral
        };
        signals.push((IndicatorKind::Cci, signal));
    }

    if let Some(obv) = snapshot.obv {
        let signal = match obv.trend {
            Trend::Up => Signal::Bullish,
            Trend::Down => Signal::Bearish,
            Trend::Flat => Signal::Neutral,
        };
        signals.push((IndicatorKind::Obv, signal));
    }

    if let Some(vwap) = snapshot.vwap {
        let signal = if vwap.deviation_pct > 0.0 {
            Signal::Bullish
        } else if vwap.deviation_pct < 0.0 {
            Signal::Bearish
        } else {
            Signal::Neutral
        };
        signals.push((IndicatorKind::Vwap, signal));
    }

    if let Some(fibonacci) = &snapshot.fibonacci {
        let signal = if fibonacci.position > 0.5 {
            Signal::Bullish
        } else if fibonacci.position < 0.5 {
            Signal::Bearish
        } else {
            Signal::Neutral
        };
        signals.push((IndicatorKind::Fibonacci, signal));
    }

    signals
}

/// Combines per-indicator votes into a tiered composite.
///
/// ratio = votes / active indicators. >= 0.7 very strong, >= 0.6 strong,
/// >= 0.4 plain, mirrored for the bearish side, neutral otherwise. With no
/// active indicators the composite is neutral.
pub fn aggregate(signals: &[(IndicatorKind, Signal)]) -> Sentiment {
    let bullish = signals.iter().filter(|(_, s)| *s == Signal::Bullish).count();
    let bearish = signals.iter().filter(|(_, s)| *s == Signal::Bearish).count();
    let neutral = signals.iter().filter(|(_, s)| *s == Signal::Neutral).count();
    let active = signals.len();

    let composite = if active == 0 {
        CompositeSignal::Neutral
    } else {
        let bull_ratio = bullish as f64 / active as f64;
        let bear_ratio = bearish as f64 / active as f64;
        if bull_ratio >= bear_ratio {
            tier(bull_ratio, true)
        } else {
            tier(bear_ratio, false)
        }
    };

    Sentiment {
        composite,
        bullish,
        bearish,
        neutral,
        active,
    }
}

fn tier(ratio: f64, bullish: bool) -> CompositeSignal {
    match (ratio, bullish) {
        (r, true) if r >= 0.7 => CompositeSignal::VeryStrongBullish,
        (r, true) if r >= 0.6 => CompositeSignal::StrongBullish,
        (r, true) if r >= 0.4 => CompositeSignal::Bullish,
        (r, false) if r >= 0.7 => CompositeSignal::VeryStrongBearish,
        (r, false) if r >= 0.6 => CompositeSignal::StrongBearish,
        (r, false) if r >= 0.4 => CompositeSignal::Bearish,
        _ => CompositeSignal::Neutral,
    }
}

/// Convenience: signals + aggregation in one call.
pub fn sentiment_of(snapshot: &IndicatorSnapshot) -> Sentiment {
    aggregate(&indicator_signals(snapshot))
}
