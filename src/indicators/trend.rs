//! Trend indicators: MACD, Ichimoku cloud and Fibonacci retracement

use crate::indicators::Crossover;
use crate::indicators::candle::Candle;
use crate::indicators::momentum::detect_crossover;
use crate::indicators::moving_averages::ema_values;

pub const DEFAULT_MACD_FAST: usize = 12;
pub const DEFAULT_MACD_SLOW: usize = 26;
pub const DEFAULT_MACD_SIGNAL: usize = 9;
pub const DEFAULT_FIB_LOOKBACK: usize = 50;

const ICHIMOKU_TENKAN: usize = 9;
const ICHIMOKU_KIJUN: usize = 26;
const ICHIMOKU_SENKOU_B: usize = 52;

/// Standard Fibonacci retracement ratios, in percent.
pub const FIB_RATIOS: [f64; 7] = [0.0, 23.6, 38.2, 50.0, 61.8, 78.6, 100.0];

/// MACD output: line, signal line, histogram and crossover state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macd {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
    /// Sign change of (line - signal) between the previous and current candle.
    pub crossover: Option<Crossover>,
}

/// Calculates MACD: fast EMA minus slow EMA, with an EMA signal line.
///
/// histogram = line - signal. Golden cross when the histogram turns from
/// <= 0 to > 0, dead cross on the mirror transition.
///
/// Defaults: fast 12, slow 26, signal 9.
/// Returns `None` if there are fewer than `slow + signal` candles.
pub fn macd(
    candles: &[Candle],
    fast: Option<usize>,
    slow: Option<usize>,
    signal: Option<usize>,
) -> Option<Macd> {
    let fast = fast.unwrap_or(DEFAULT_MACD_FAST);
    let slow = slow.unwrap_or(DEFAULT_MACD_SLOW);
    let signal = signal.unwrap_or(DEFAULT_MACD_SIGNAL);

    if fast == 0 || slow == 0 || signal == 0 || fast >= slow {
        return None;
    }
    if candles.len() < slow + signal {
        return None;
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.get_close()).collect();
    let ema_fast = ema_values(&closes, fast);
    let ema_slow = ema_values(&closes, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_values(&macd_line, signal);

    let last = macd_line.len() - 1;
    let line = macd_line[last];
    let sig = signal_line[last];
    let crossover = detect_crossover(macd_line[last - 1] - signal_line[last - 1], line - sig);

    Some(Macd {
        line,
        signal: sig,
        histogram: line - sig,
        crossover,
    })
}

/// Ichimoku cloud components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ichimoku {
    /// Conversion line: 9-period midpoint.
    pub tenkan: f64,
    /// Base line: 26-period midpoint.
    pub kijun: f64,
    /// Leading span A: average of tenkan and kijun.
    pub senkou_a: f64,
    /// Leading span B: 52-period midpoint.
    pub senkou_b: f64,
    /// Lagging span: close 26 periods back (current close if unavailable).
    pub chikou: f64,
}

impl Ichimoku {
    pub fn cloud_top(&self) -> f64 {
        self.senkou_a.max(self.senkou_b)
    }

    pub fn cloud_bottom(&self) -> f64 {
        self.senkou_a.min(self.senkou_b)
    }
}

fn midpoint(candles: &[Candle], period: usize) -> f64 {
    let window = &candles[candles.len() - period..];
    let highest = window.iter().map(|c| c.get_high()).fold(f64::MIN, f64::max);
    let lowest = window.iter().map(|c| c.get_low()).fold(f64::MAX, f64::min);
    (highest + lowest) / 2.0
}

/// Calculates the five Ichimoku components over the standard 9/26/52 periods.
///
/// Returns `None` if there are fewer than 52 candles.
pub fn ichimoku(candles: &[Candle]) -> Option<Ichimoku> {
    if candles.len() < ICHIMOKU_SENKOU_B {
        return None;
    }

    let tenkan = midpoint(candles, ICHIMOKU_TENKAN);
    let kijun = midpoint(candles, ICHIMOKU_KIJUN);
    let chikou = if candles.len() > ICHIMOKU_KIJUN {
        candles[candles.len() - 1 - ICHIMOKU_KIJUN].get_close()
    } else {
        candles[candles.len() - 1].get_close()
    };

    Some(Ichimoku {
        tenkan,
        kijun,
        senkou_a: (tenkan + kijun) / 2.0,
        senkou_b: midpoint(candles, ICHIMOKU_SENKOU_B),
        chikou,
    })
}

/// One Fibonacci retracement level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FibLevel {
    /// Retracement ratio in percent (0, 23.6, ..., 100).
    pub ratio: f64,
    /// Price at this retracement, measured down from the window high.
    pub price: f64,
}

/// Fibonacci retracement over a lookback window.
#[derive(Debug, Clone, PartialEq)]
pub struct Fibonacci {
    pub high: f64,
    pub low: f64,
    pub levels: Vec<FibLevel>,
    /// Current close as a fraction of the window range, in [0, 1]
    /// (the close of the final candle always lies inside the window's
    /// high/low).
    pub position: f64,
    /// Ratio of the level closest to the current position.
    pub nearest_ratio: f64,
}

/// Calculates Fibonacci retracement levels over the last `lookback` candles
/// (the whole series if shorter, default lookback 50).
///
/// Returns `None` with fewer than 2 candles or a zero high-low range.
pub fn fibonacci(candles: &[Candle], lookback: Option<usize>) -> Option<Fibonacci> {
    let lookback = lookback.unwrap_or(DEFAULT_FIB_LOOKBACK);

    if lookback < 2 || candles.len() < 2 {
        return None;
    }

    let window = &candles[candles.len().saturating_sub(lookback)..];
    let high = window.iter().map(|c| c.get_high()).fold(f64::MIN, f64::max);
    let low = window.iter().map(|c| c.get_low()).fold(f64::MAX, f64::min);
    let range = high - low;
    if range <= 0.0 {
        return None;
    }

    let levels: Vec<FibLevel> = FIB_RATIOS
        .iter()
        .map(|&ratio| FibLevel {
            ratio,
            price: high - range * ratio / 100.0,
        })
        .collect();

    let close = window[window.len() - 1].get_close();
    let position = (close - low) / range;

    // Position is measured up from the low; ratios measure down from the
    // high, so compare against the mirrored position.
    let descent = (1.0 - position) * 100.0;
    let nearest_ratio = FIB_RATIOS
        .iter()
        .copied()
        .min_by(|a, b| {
            (a - descent)
                .abs()
                .partial_cmp(&(b - descent).abs())
                .expect("ratios and descent are finite")
        })
        .expect("FIB_RATIOS is non-empty");

    Some(Fibonacci {
        high,
        low,
        levels,
        position,
        nearest_ratio,
    })
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

    fn long_uptrend(len: usize) -> Vec<Candle> {
        let closes: Vec<f64> = (0..len).map(|i| 100.0 + i as f64).collect();
        candles_from_closes(&closes)
    }

    #[test]
    fn test_macd_positive_in_uptrend() {
        let result = macd(&long_uptrend(60), None, None, None).unwrap();
        // Fast EMA above slow EMA in a sustained rise.
        assert!(result.line > 0.0);
        assert!((result.histogram - (result.line - result.signal)).abs() < 1e-12);
    }

    #[test]
    fn test_macd_insufficient_candles() {
        assert_eq!(macd(&long_uptrend(30), None, None, None), None);
    }

    #[test]
    fn test_macd_golden_cross_on_reversal() {
        // Long decline, then a sharp rally: the line must cross above the
        // signal at some point during the rally.
        let mut closes: Vec<f64> = (0..60).map(|i| 200.0 - i as f64).collect();
        for i in 0..30 {
            closes.push(141.0 + (i as f64) * 4.0);
        }
        let candles = candles_from_closes(&closes);

        let mut saw_golden = false;
        for end in 40..candles.len() {
            if let Some(m) = macd(&candles[..=end], None, None, None) {
                if m.crossover == Some(Crossover::Golden) {
                    saw_golden = true;
                }
            }
        }
        assert!(saw_golden, "rally after decline should produce a golden cross");
    }

    #[test]
    fn test_ichimoku_components() {
        let candles = long_uptrend(80);
        let result = ichimoku(&candles).unwrap();

        // Rising market: short midpoint above long midpoint.
        assert!(result.tenkan > result.kijun);
        assert!(result.senkou_a > result.senkou_b);
        assert_eq!(result.senkou_a, (result.tenkan + result.kijun) / 2.0);
        assert_eq!(result.cloud_top(), result.senkou_a.max(result.senkou_b));
        assert!(result.cloud_bottom() <= result.cloud_top());

        // Chikou: close 26 candles back. Index 80-1-26 = 53, close 153.
        assert_eq!(result.chikou, 153.0);
    }

    #[test]
    fn test_ichimoku_insufficient_candles() {
        assert_eq!(ichimoku(&long_uptrend(51)), None);
    }

    #[test]
    fn test_fibonacci_levels() {
        // Range 90..=160 (high of last candle is close+1, low of first
        // candle in window is close-1).
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let candles = candles_from_closes(&closes);
        let result = fibonacci(&candles, Some(50)).unwrap();

        assert_eq!(result.levels.len(), 7);
        assert_eq!(result.levels[0].ratio, 0.0);
        assert_eq!(result.levels[0].price, result.high);
        assert_eq!(result.levels[6].price, result.low);
        // Levels descend from high to low.
        for pair in result.levels.windows(2) {
            assert!(pair[0].price > pair[1].price);
        }
        // Close sits near the top of the window.
        assert!(result.position > 0.9);
        assert_eq!(result.nearest_ratio, 0.0);
    }

    #[test]
    fn test_fibonacci_zero_range() {
        let candles: Vec<Candle> = (0..10)
            .map(|_| Candle::new(0, 100.0, 100.0, 100.0, 100.0, 1000.0))
            .collect();
        assert_eq!(fibonacci(&candles, Some(10)), None);
    }

    #[test]
    fn test_fibonacci_insufficient_candles() {
        let candles = candles_from_closes(&[100.0]);
        assert_eq!(fibonacci(&candles, None), None);
    }
}
