//! Bounded, time-ordered candle storage per asset

use std::collections::VecDeque;

use tracing::trace;

use crate::indicators::candle::Candle;

pub const DEFAULT_STORE_CAPACITY: usize = 300;

/// A bounded candle series for one asset, strictly increasing by timestamp.
///
/// Appending past capacity drops the oldest candles (FIFO). Appends that
/// would break the ordering invariant (duplicate or older timestamps, as
/// produced by redundant polling) are silently ignored, as are malformed
/// candles; redundant fetches are expected, not exceptional.
#[derive(Debug, Clone)]
pub struct CandleStore {
    candles: VecDeque<Candle>,
    capacity: usize,
}

impl CandleStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            candles: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Appends a candle, keeping the series sorted and bounded.
    ///
    /// Returns `true` if the candle was stored. A candle whose timestamp is
    /// not strictly greater than the last stored one, or whose fields are
    /// non-finite/non-positive, is dropped as a no-op.
    pub fn append(&mut self, candle: Candle) -> bool {
        if !candle.is_well_formed() {
            trace!(timestamp = candle.get_timestamp(), "dropping malformed candle");
            return false;
        }
        if let Some(last) = self.candles.back()
            && candle.get_timestamp() <= last.get_timestamp()
        {
            trace!(
                timestamp = candle.get_timestamp(),
                last = last.get_timestamp(),
                "dropping out-of-order candle"
            );
            return false;
        }

        if self.candles.len() == self.capacity {
            self.candles.pop_front();
        }
        self.candles.push_back(candle);
        true
    }

    /// Appends a batch, returning how many candles were actually stored.
    pub fn extend(&mut self, candles: impl IntoIterator<Item = Candle>) -> usize {
        candles
            .into_iter()
            .filter(|candle| self.append(*candle))
            .count()
    }

    /// Returns an owned copy of the last `n` candles (or fewer if the store
    /// holds fewer).
    ///
    /// The copy stays valid across later appends/trims, so indicator
    /// computation can never observe a half-trimmed buffer.
    pub fn snapshot(&self, n: usize) -> Vec<Candle> {
        let skip = self.candles.len().saturating_sub(n);
        self.candles.iter().skip(skip).copied().collect()
    }

    /// Copy of the full series.
    pub fn all(&self) -> Vec<Candle> {
        self.snapshot(self.candles.len())
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.back()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for CandleStore {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle_at(timestamp: i64, close: f64) -> Candle {
        Candle::new(timestamp, close, close + 1.0, close - 1.0, close, 1000.0)
    }

    #[test]
    fn test_append_keeps_order() {
        let mut store = CandleStore::new(10);
        assert!(store.append(candle_at(1000, 100.0)));
        assert!(store.append(candle_at(2000, 101.0)));
        assert_eq!(store.len(), 2);
        assert_eq!(store.last().unwrap().get_timestamp(), 2000);
    }

    #[test]
    fn test_out_of_order_append_is_noop() {
        let mut store = CandleStore::new(10);
        store.append(candle_at(2000, 100.0));
        let before = store.all();

        // Older and duplicate timestamps are both ignored.
        assert!(!store.append(candle_at(1000, 99.0)));
        assert!(!store.append(candle_at(2000, 99.0)));

        assert_eq!(store.all(), before);
    }

    #[test]
    fn test_malformed_candle_is_noop() {
        let mut store = CandleStore::new(10);
        assert!(!store.append(Candle::new(1000, f64::NAN, 1.0, 1.0, 1.0, 1.0)));
        assert!(!store.append(Candle::new(1000, 10.0, 11.0, 9.0, 10.0, -5.0)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut store = CandleStore::new(3);
        for i in 0..5 {
            store.append(candle_at(i * 1000, 100.0 + i as f64));
        }
        assert_eq!(store.len(), 3);
        let all = store.all();
        assert_eq!(all[0].get_timestamp(), 2000);
        assert_eq!(all[2].get_timestamp(), 4000);
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let mut store = CandleStore::new(3);
        for i in 0..3 {
            store.append(candle_at(i * 1000, 100.0));
        }
        let snap = store.snapshot(2);
        assert_eq!(snap.len(), 2);

        // Force a trim; the earlier snapshot must be unaffected.
        store.append(candle_at(5000, 200.0));
        assert_eq!(snap[0].get_timestamp(), 1000);
        assert_eq!(snap[1].get_timestamp(), 2000);
    }

    #[test]
    fn test_snapshot_shorter_than_requested() {
        let mut store = CandleStore::new(10);
        store.append(candle_at(1000, 100.0));
        assert_eq!(store.snapshot(5).len(), 1);
    }

    #[test]
    fn test_extend_counts_accepted() {
        let mut store = CandleStore::new(10);
        let batch = vec![
            candle_at(1000, 100.0),
            candle_at(500, 99.0), // out of order
            candle_at(2000, 101.0),
        ];
        assert_eq!(store.extend(batch), 2);
        assert_eq!(store.len(), 2);
    }
}
