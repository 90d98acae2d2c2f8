//! Momentum oscillators: RSI, Stochastic, Williams %R and CCI

use crate::indicators::Crossover;
use crate::indicators::candle::Candle;
use crate::indicators::moving_averages::sma_values;

pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_STOCH_K_PERIOD: usize = 14;
pub const DEFAULT_STOCH_D_PERIOD: usize = 3;
pub const DEFAULT_WILLIAMS_PERIOD: usize = 14;
pub const DEFAULT_CCI_PERIOD: usize = 20;

/// Calculates the Relative Strength Index (RSI) using Wilder's smoothing.
///
/// RSI = 100 - (100 / (1 + RS)) where RS = Average Gain / Average Loss.
/// The first averages are simple means over the first `period` price
/// changes; every later average is smoothed:
/// avg = (avg * (period - 1) + new) / period
///
/// When the average loss is zero the RSI is pinned to 100 rather than
/// dividing by zero.
///
/// Pass `None` to use the default period of 14.
/// Returns `None` if there are fewer than `period + 1` candles.
pub fn rsi(candles: &[Candle], period: Option<usize>) -> Option<f64> {
    let period = period.unwrap_or(DEFAULT_RSI_PERIOD);
    rsi_series(candles, Some(period)).last().copied()
}

/// Calculates the full Wilder-smoothed RSI series.
///
/// The first value corresponds to the point where `period + 1` candles are
/// available. Returns an empty vector if there are not enough candles.
pub fn rsi_series(candles: &[Candle], period: Option<usize>) -> Vec<f64> {
    let period = period.unwrap_or(DEFAULT_RSI_PERIOD);

    if period == 0 || candles.len() < period + 1 {
        return Vec::new();
    }

    let changes: Vec<f64> = candles
        .windows(2)
        .map(|pair| pair[1].get_close() - pair[0].get_close())
        .collect();

    let gain = |c: f64| if c > 0.0 { c } else { 0.0 };
    let loss = |c: f64| if c < 0.0 { -c } else { 0.0 };

    // Initial averages: simple mean over the first `period` changes.
    let mut avg_gain: f64 = changes[..period].iter().map(|&c| gain(c)).sum::<f64>() / period as f64;
    let mut avg_loss: f64 = changes[..period].iter().map(|&c| loss(c)).sum::<f64>() / period as f64;

    let rsi_of = |avg_gain: f64, avg_loss: f64| {
        if avg_loss == 0.0 {
            100.0
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - (100.0 / (1.0 + rs))
        }
    };

    let mut rsi_values = Vec::with_capacity(changes.len() - period + 1);
    rsi_values.push(rsi_of(avg_gain, avg_loss));

    for &change in &changes[period..] {
        avg_gain = (avg_gain * (period - 1) as f64 + gain(change)) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss(change)) / period as f64;
        rsi_values.push(rsi_of(avg_gain, avg_loss));
    }

    rsi_values
}

/// Stochastic oscillator output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stochastic {
    /// Fast line: position of the close within the recent high/low range.
    pub k: f64,
    /// Slow line: SMA of %K over the %D period.
    pub d: f64,
    /// Sign change of (%K - %D) between the previous and current sample.
    pub crossover: Option<Crossover>,
}

/// Calculates the Stochastic oscillator.
///
/// %K = (close - lowestLow) / (highestHigh - lowestLow) * 100 over
/// `k_period`; %D = SMA(%K, `d_period`). A flat window (highest == lowest)
/// yields %K = 50 rather than a division by zero.
///
/// Requires `k_period + d_period` candles so that a previous %K/%D pair
/// exists for crossover detection. Returns `None` otherwise.
pub fn stochastic(
    candles: &[Candle],
    k_period: Option<usize>,
    d_period: Option<usize>,
) -> Option<Stochastic> {
    let k_period = k_period.unwrap_or(DEFAULT_STOCH_K_PERIOD);
    let d_period = d_period.unwrap_or(DEFAULT_STOCH_D_PERIOD);

    if k_period == 0 || d_period == 0 || candles.len() < k_period + d_period {
        return None;
    }

    // One %K value per complete k_period window.
    let k_series: Vec<f64> = candles
        .windows(k_period)
        .map(|window| {
            let highest = window
                .iter()
                .map(|c| c.get_high())
                .fold(f64::MIN, f64::max);
            let lowest = window.iter().map(|c| c.get_low()).fold(f64::MAX, f64::min);
            let close = window[window.len() - 1].get_close();
            if highest == lowest {
                50.0
            } else {
                (close - lowest) / (highest - lowest) * 100.0
            }
        })
        .collect();

    let k = *k_series.last()?;
    let d = sma_values(&k_series, d_period)?;

    let crossover = if k_series.len() > d_period {
        let prev_k = k_series[k_series.len() - 2];
        let prev_d = sma_values(&k_series[..k_series.len() - 1], d_period)?;
        detect_crossover(prev_k - prev_d, k - d)
    } else {
        None
    };

    Some(Stochastic { k, d, crossover })
}

/// Sign-change crossover rule shared by MACD and Stochastic:
/// golden when the spread was <= 0 and is now > 0, dead when it was >= 0
/// and is now < 0.
pub(crate) fn detect_crossover(prev_spread: f64, spread: f64) -> Option<Crossover> {
    if prev_spread <= 0.0 && spread > 0.0 {
        Some(Crossover::Golden)
    } else if prev_spread >= 0.0 && spread < 0.0 {
        Some(Crossover::Dead)
    } else {
        None
    }
}

/// Calculates Williams %R.
///
/// %R = (highestHigh - close) / (highestHigh - lowestLow) * -100
///
/// Always in [-100, 0]; a flat window yields -50.
/// Returns `None` if there are fewer than `period` candles.
pub fn williams_r(candles: &[Candle], period: Option<usize>) -> Option<f64> {
    let period = period.unwrap_or(DEFAULT_WILLIAMS_PERIOD);

    if period == 0 || candles.len() < period {
        return None;
    }

    let window = &candles[candles.len() - period..];
    let highest = window.iter().map(|c| c.get_high()).fold(f64::MIN, f64::max);
    let lowest = window.iter().map(|c| c.get_low()).fold(f64::MAX, f64::min);
    let close = window[window.len() - 1].get_close();

    if highest == lowest {
        return Some(-50.0);
    }

    Some((highest - close) / (highest - lowest) * -100.0)
}

/// Calculates the Commodity Channel Index (CCI).
///
/// CCI = (typicalPrice - SMA(typicalPrice)) / (0.015 * meanAbsoluteDeviation)
///
/// A zero mean deviation (perfectly flat typical prices) yields 0 rather
/// than a division by zero.
/// Returns `None` if there are fewer than `period` candles.
pub fn cci(candles: &[Candle], period: Option<usize>) -> Option<f64> {
    let period = period.unwrap_or(DEFAULT_CCI_PERIOD);

    if period == 0 || candles.len() < period {
        return None;
    }

    let typical: Vec<f64> = candles[candles.len() - period..]
        .iter()
        .map(|c| c.hlc3())
        .collect();
    let mean = typical.iter().sum::<f64>() / period as f64;
    let mean_deviation = typical.iter().map(|tp| (tp - mean).abs()).sum::<f64>() / period as f64;

    if mean_deviation == 0.0 {
        return Some(0.0);
    }

    let current = typical[typical.len() - 1];
    Some((current - mean) / (0.015 * mean_deviation))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .map(|&c| Candle::new(0, c, c + 1.0, c - 1.0, c, 1000.0))
            .collect()
    }

    fn uptrend_candles() -> Vec<Candle> {
        candles_from_closes(&[
            100.0, 102.0, 105.0, 108.0, 112.0, 116.0, 120.0, 125.0, 130.0, 136.0, 142.0, 148.0,
            155.0, 162.0, 170.0,
        ])
    }

    fn downtrend_candles() -> Vec<Candle> {
        candles_from_closes(&[
            170.0, 165.0, 160.0, 154.0, 148.0, 142.0, 135.0, 128.0, 121.0, 114.0, 107.0, 100.0,
            93.0, 86.0, 80.0,
        ])
    }

    #[test]
    fn test_rsi_overbought_in_uptrend() {
        let result = rsi(&uptrend_candles(), Some(14)).unwrap();
        assert!(result > 70.0, "RSI ({}) should be > 70", result);
    }

    #[test]
    fn test_rsi_oversold_in_downtrend() {
        let result = rsi(&downtrend_candles(), Some(14)).unwrap();
        assert!(result < 30.0, "RSI ({}) should be < 30", result);
    }

    #[test]
    fn test_rsi_all_gains_is_100() {
        // Monotonic rise with no losses pins RSI at the 100 sentinel.
        let result = rsi(&uptrend_candles(), Some(14)).unwrap();
        assert_eq!(result, 100.0);
    }

    #[test]
    fn test_rsi_insufficient_candles() {
        let candles = candles_from_closes(&[100.0, 102.0]);
        assert_eq!(rsi(&candles, Some(14)), None);
    }

    #[test]
    fn test_rsi_bounds() {
        for candles in [uptrend_candles(), downtrend_candles()] {
            let result = rsi(&candles, Some(5)).unwrap();
            assert!((0.0..=100.0).contains(&result));
        }
    }

    #[test]
    fn test_rsi_wilder_smoothing_reference() {
        // 30 closes: 100, 101, 99, 98, 97, ... strictly falling after the
        // second sample. Verify against a direct transcription of Wilder's
        // recurrence.
        let mut closes = vec![100.0, 101.0];
        let mut price = 101.0;
        for _ in 0..28 {
            price -= 1.0;
            closes.push(price);
        }
        let candles = candles_from_closes(&closes);
        let period = 14;
        let result = rsi(&candles, Some(period)).unwrap();

        let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
        let mut avg_gain = changes[..period]
            .iter()
            .map(|&c| c.max(0.0))
            .sum::<f64>()
            / period as f64;
        let mut avg_loss = changes[..period]
            .iter()
            .map(|&c| (-c).max(0.0))
            .sum::<f64>()
            / period as f64;
        for &c in &changes[period..] {
            avg_gain = (avg_gain * (period - 1) as f64 + c.max(0.0)) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + (-c).max(0.0)) / period as f64;
        }
        let expected = 100.0 - (100.0 / (1.0 + avg_gain / avg_loss));

        assert!((result - expected).abs() < 1e-6);
        assert!(result < 30.0, "sustained decline should read oversold");
    }

    #[test]
    fn test_stochastic_bounds() {
        let result = stochastic(&uptrend_candles(), Some(10), Some(3)).unwrap();
        assert!((0.0..=100.0).contains(&result.k));
        assert!((0.0..=100.0).contains(&result.d));
    }

    #[test]
    fn test_stochastic_high_in_uptrend() {
        let result = stochastic(&uptrend_candles(), Some(10), Some(3)).unwrap();
        assert!(result.k > 80.0, "%K ({}) should be high in uptrend", result.k);
    }

    #[test]
    fn test_stochastic_insufficient_candles() {
        let candles = candles_from_closes(&[100.0, 101.0, 102.0]);
        assert_eq!(stochastic(&candles, Some(14), Some(3)), None);
    }

    #[test]
    fn test_stochastic_flat_window_sentinel() {
        let candles: Vec<Candle> = (0..20)
            .map(|_| Candle::new(0, 100.0, 100.0, 100.0, 100.0, 1000.0))
            .collect();
        let result = stochastic(&candles, Some(14), Some(3)).unwrap();
        assert_eq!(result.k, 50.0);
    }

    #[test]
    fn test_detect_crossover() {
        assert_eq!(detect_crossover(-1.0, 1.0), Some(Crossover::Golden));
        assert_eq!(detect_crossover(0.0, 1.0), Some(Crossover::Golden));
        assert_eq!(detect_crossover(1.0, -1.0), Some(Crossover::Dead));
        assert_eq!(detect_crossover(0.0, -1.0), Some(Crossover::Dead));
        assert_eq!(detect_crossover(1.0, 2.0), None);
        assert_eq!(detect_crossover(-1.0, -2.0), None);
    }

    #[test]
    fn test_williams_r_bounds() {
        let up = williams_r(&uptrend_candles(), Some(14)).unwrap();
        let down = williams_r(&downtrend_candles(), Some(14)).unwrap();
        assert!((-100.0..=0.0).contains(&up));
        assert!((-100.0..=0.0).contains(&down));
        // Close near the top of the range reads near 0; near the bottom, near -100.
        assert!(up > -20.0);
        assert!(down < -80.0);
    }

    #[test]
    fn test_williams_r_flat_window_sentinel() {
        let candles: Vec<Candle> = (0..14)
            .map(|_| Candle::new(0, 100.0, 100.0, 100.0, 100.0, 1000.0))
            .collect();
        assert_eq!(williams_r(&candles, Some(14)), Some(-50.0));
    }

    #[test]
    fn test_cci_sign_tracks_trend() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let up = cci(&candles_from_closes(&closes), Some(20)).unwrap();
        assert!(up > 0.0, "CCI ({}) should be positive in uptrend", up);

        let closes: Vec<f64> = (0..25).map(|i| 200.0 - i as f64).collect();
        let down = cci(&candles_from_closes(&closes), Some(20)).unwrap();
        assert!(down < 0.0, "CCI ({}) should be negative in downtrend", down);
    }

    #[test]
    fn test_cci_flat_series_sentinel() {
        let candles: Vec<Candle> = (0..25)
            .map(|_| Candle::new(0, 100.0, 100.0, 100.0, 100.0, 1000.0))
            .collect();
        assert_eq!(cci(&candles, Some(20)), Some(0.0));
    }

    #[test]
    fn test_cci_insufficient_candles() {
        let candles = candles_from_closes(&[100.0, 101.0]);
        assert_eq!(cci(&candles, Some(20)), None);
    }
}
