//! Moving Average indicators: Simple Moving Average (SMA) and Exponential Moving Average (EMA)

use crate::indicators::candle::Candle;

/// Calculates the Simple Moving Average (SMA) over a slice of candles.
///
/// SMA = (C1 + C2 + ... + Cn) / n
///
/// Uses the closing prices of the most recent `period` candles.
/// Returns `None` if there are not enough candles for the given period.
pub fn sma(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period {
        return None;
    }

    let start_index = candles.len() - period;
    let sum: f64 = candles[start_index..].iter().map(|c| c.get_close()).sum();

    Some(sum / period as f64)
}

/// Calculates the SMA over a raw slice of values.
///
/// Same formula as [`sma`], for callers that already extracted a price
/// series (e.g., a %K series or a plain price history).
pub fn sma_values(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }

    let start_index = values.len() - period;
    Some(values[start_index..].iter().sum::<f64>() / period as f64)
}

/// Calculates the Exponential Moving Average (EMA) over closing prices.
///
/// EMA gives more weight to recent prices using a smoothing multiplier.
/// EMA = Close * k + EMA_prev * (1 - k)
/// where k = 2 / (period + 1)
///
/// Returns `None` if there are not enough candles for the given period.
pub fn ema(candles: &[Candle], period: usize) -> Option<f64> {
    let closes: Vec<f64> = candles.iter().map(|c| c.get_close()).collect();
    ema_values(&closes, period).last().copied()
}

/// Calculates the full EMA series over a slice of values.
///
/// The first EMA value is seeded with the first element of the series, so
/// the returned vector has the same length as the input. Seeding with the
/// first value (rather than an initial SMA) keeps the recurrence defined
/// for every index, which MACD's signal-line EMA relies on.
///
/// Returns an empty vector if the input is shorter than `period`.
pub fn ema_values(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema_series = Vec::with_capacity(values.len());
    ema_series.push(values[0]);

    for &value in &values[1..] {
        let prev = ema_series[ema_series.len() - 1];
        ema_series.push(value * k + prev * (1.0 - k));
    }

    ema_series
}

/// Calculates the full SMA series over closing prices.
///
/// Returns a vector of SMA values starting from the first calculable point,
/// with length `candles.len() - period + 1`.
/// Returns an empty vector if there are not enough candles.
pub fn sma_series(candles: &[Candle], period: usize) -> Vec<f64> {
    if period == 0 || candles.len() < period {
        return Vec::new();
    }

    let mut sma_series = Vec::with_capacity(candles.len() - period + 1);

    for i in (period - 1)..candles.len() {
        let start = i + 1 - period;
        let sum: f64 = candles[start..=i].iter().map(|c| c.get_close()).sum();
        sma_series.push(sum / period as f64);
    }

    sma_series
}
