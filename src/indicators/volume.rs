//! Volume indicators: On-Balance Volume (OBV) and VWAP

use crate::indicators::candle::Candle;

pub const DEFAULT_VWAP_WINDOW: usize = 20;

/// Window used for OBV/price trend comparison.
const DIVERGENCE_WINDOW: usize = 10;

/// Direction of a series over a comparison window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

fn trend_of(first: f64, last: f64) -> Trend {
    if last > first {
        Trend::Up
    } else if last < first {
        Trend::Down
    } else {
        Trend::Flat
    }
}

/// On-Balance Volume output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obv {
    /// Cumulative signed volume over the whole series.
    pub value: f64,
    /// Direction of OBV over the last 10 samples.
    pub trend: Trend,
    /// True when price direction and OBV direction disagree over the last
    /// 10 samples (both moving, in opposite directions).
    pub divergence: bool,
}

/// Calculates On-Balance Volume.
///
/// Volume is added on a close above the previous close, subtracted on a
/// close below it, and carried unchanged on a tie.
///
/// Returns `None` with fewer than 2 candles.
pub fn obv(candles: &[Candle]) -> Option<Obv> {
    if candles.len() < 2 {
        return None;
    }

    let mut series = Vec::with_capacity(candles.len());
    series.push(0.0);
    for pair in candles.windows(2) {
        let prev_obv = series[series.len() - 1];
        let delta = if pair[1].get_close() > pair[0].get_close() {
            pair[1].get_volume()
        } else if pair[1].get_close() < pair[0].get_close() {
            -pair[1].get_volume()
        } else {
            0.0
        };
        series.push(prev_obv + delta);
    }

    let window = DIVERGENCE_WINDOW.min(series.len());
    let obv_window = &series[series.len() - window..];
    let obv_trend = trend_of(obv_window[0], obv_window[obv_window.len() - 1]);

    let price_window = &candles[candles.len() - window..];
    let price_trend = trend_of(
        price_window[0].get_close(),
        price_window[price_window.len() - 1].get_close(),
    );

    let divergence = matches!(
        (price_trend, obv_trend),
        (Trend::Up, Trend::Down) | (Trend::Down, Trend::Up)
    );

    Some(Obv {
        value: series[series.len() - 1],
        trend: obv_trend,
        divergence,
    })
}

/// VWAP output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vwap {
    pub value: f64,
    /// (close - VWAP) / VWAP * 100.
    pub deviation_pct: f64,
}

/// Calculates the Volume-Weighted Average Price over the last `window`
/// candles (default 20, the whole series if shorter).
///
/// VWAP = sum(typicalPrice * volume) / sum(volume).
///
/// Returns `None` for an empty series or zero total volume, where no
/// meaningful average exists.
pub fn vwap(candles: &[Candle], window: Option<usize>) -> Option<Vwap> {
    let window = window.unwrap_or(DEFAULT_VWAP_WINDOW);
    if window == 0 || candles.is_empty() {
        return None;
    }

    let slice = &candles[candles.len().saturating_sub(window)..];
    let total_volume: f64 = slice.iter().map(|c| c.get_volume()).sum();
    if total_volume == 0.0 {
        return None;
    }

    let weighted: f64 = slice.iter().map(|c| c.hlc3() * c.get_volume()).sum();
    let value = weighted / total_volume;
    let close = slice[slice.len() - 1].get_close();

    Some(Vwap {
        value,
        deviation_pct: (close - value) / value * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(close: f64, volume: f64) -> Candle {
        Candle::new(0, close, close + 1.0, close - 1.0, close, volume)
    }

    #[test]
    fn test_obv_accumulates_signed_volume() {
        // up (+200), down (-300), tie (0)
        let candles = vec![
            candle(100.0, 100.0),
            candle(101.0, 200.0),
            candle(99.0, 300.0),
            candle(99.0, 400.0),
        ];
        let result = obv(&candles).unwrap();
        assert_eq!(result.value, -100.0);
        assert_eq!(result.trend, Trend::Down);
    }

    #[test]
    fn test_obv_divergence() {
        // Price grinds up while volume flows out: every second candle is a
        // heavy down candle, so OBV falls while closes finish higher.
        let mut candles = vec![candle(100.0, 100.0)];
        for i in 0..10 {
            if i % 2 == 0 {
                candles.push(candle(100.0 + i as f64 + 2.0, 100.0));
            } else {
                candles.push(candle(100.0 + i as f64 - 1.0, 1000.0));
            }
        }
        let result = obv(&candles).unwrap();
        assert_eq!(result.trend, Trend::Down);
        assert!(result.divergence, "price up with OBV down must flag divergence");
    }

    #[test]
    fn test_obv_no_divergence_when_aligned() {
        let candles: Vec<Candle> = (0..12).map(|i| candle(100.0 + i as f64, 100.0)).collect();
        let result = obv(&candles).unwrap();
        assert_eq!(result.trend, Trend::Up);
        assert!(!result.divergence);
    }

    #[test]
    fn test_obv_insufficient_candles() {
        assert_eq!(obv(&[candle(100.0, 100.0)]), None);
    }

    #[test]
    fn test_vwap_weights_by_volume() {
        // Heavy volume at 90 drags VWAP below the simple mean of typical prices.
        let candles = vec![candle(90.0, 1000.0), candle(110.0, 100.0)];
        let result = vwap(&candles, Some(20)).unwrap();
        assert!(result.value < 100.0);
        // Close (110) sits above the volume-weighted average.
        assert!(result.deviation_pct > 0.0);
    }

    #[test]
    fn test_vwap_exact_value() {
        let candles = vec![candle(100.0, 300.0)];
        // Typical price = (101 + 99 + 100) / 3 = 100.
        let result = vwap(&candles, Some(20)).unwrap();
        assert_eq!(result.value, 100.0);
        assert_eq!(result.deviation_pct, 0.0);
    }

    #[test]
    fn test_vwap_zero_volume() {
        let candles = vec![candle(100.0, 0.0), candle(101.0, 0.0)];
        assert_eq!(vwap(&candles, Some(20)), None);
    }

    #[test]
    fn test_vwap_empty_series() {
        assert_eq!(vwap(&[], None), None);
    }
}
