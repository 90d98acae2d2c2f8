//! Volatility indicators: Bollinger Bands

use crate::indicators::candle::Candle;
use crate::indicators::moving_averages::sma;

pub const DEFAULT_BOLLINGER_PERIOD: usize = 20;
pub const DEFAULT_BOLLINGER_MULTIPLIER: f64 = 2.0;

/// Number of trailing windows averaged for squeeze detection.
const SQUEEZE_WINDOWS: usize = 10;
/// A squeeze is flagged when current bandwidth drops below this fraction of
/// the trailing average bandwidth.
const SQUEEZE_RATIO: f64 = 0.8;

/// Bollinger Bands output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bollinger {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// (upper - lower) / middle; 0 when the middle band is 0.
    pub bandwidth: f64,
    /// True when current bandwidth is below 0.8x the average bandwidth of
    /// the trailing 10 windows (volatility contraction).
    pub squeeze: bool,
}

/// Calculates Bollinger Bands: SMA(period) +/- population stddev * multiplier.
///
/// Pass `None` to use the defaults (period 20, multiplier 2).
/// Returns `None` if there are fewer than `period` candles.
pub fn bollinger(
    candles: &[Candle],
    period: Option<usize>,
    multiplier: Option<f64>,
) -> Option<Bollinger> {
    let period = period.unwrap_or(DEFAULT_BOLLINGER_PERIOD);
    let multiplier = multiplier.unwrap_or(DEFAULT_BOLLINGER_MULTIPLIER);

    let current = bands_at(candles, candles.len(), period, multiplier)?;

    // Average bandwidth over the trailing windows (as many as exist, up to
    // 10) for squeeze detection.
    let mut bandwidths = Vec::with_capacity(SQUEEZE_WINDOWS);
    for back in 0..SQUEEZE_WINDOWS {
        match bands_at(candles, candles.len() - back, period, multiplier) {
            Some((_, _, _, bandwidth)) => bandwidths.push(bandwidth),
            None => break,
        }
    }
    let avg_bandwidth = bandwidths.iter().sum::<f64>() / bandwidths.len() as f64;

    let (upper, middle, lower, bandwidth) = current;
    Some(Bollinger {
        upper,
        middle,
        lower,
        bandwidth,
        squeeze: bandwidths.len() > 1 && bandwidth < SQUEEZE_RATIO * avg_bandwidth,
    })
}

/// Bands for the window ending at `end` (exclusive).
/// Returns (upper, middle, lower, bandwidth).
fn bands_at(
    candles: &[Candle],
    end: usize,
    period: usize,
    multiplier: f64,
) -> Option<(f64, f64, f64, f64)> {
    if end > candles.len() {
        return None;
    }
    let window = &candles[..end];
    let middle = sma(window, period)?;

    let closes = &window[window.len() - period..];
    let variance = closes
        .iter()
        .map(|c| {
            let diff = c.get_close() - middle;
            diff * diff
        })
        .sum::<f64>()
        / period as f64;
    let stddev = variance.sqrt();

    let upper = middle + stddev * multiplier;
    let lower = middle - stddev * multiplier;
    let bandwidth = if middle == 0.0 {
        0.0
    } else {
        (upper - lower) / middle
    };

    Some((upper, middle, lower, bandwidth))
}
