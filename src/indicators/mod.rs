//! Technical indicators for market analysis
//!
//! Every indicator is a pure function over a candle slice. Indicators
//! return `None` when the slice is shorter than their minimum period;
//! callers must treat that as a distinct "insufficient data" state, never
//! as zero or neutral.

pub mod candle;
pub mod momentum;
pub mod moving_averages;
pub mod snapshot;
pub mod trend;
pub mod volatility;
pub mod volume;

use serde::{Deserialize, Serialize};

/// Direction of a line crossover between an indicator and its signal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crossover {
    /// Indicator crossed above its signal line (bullish).
    Golden,
    /// Indicator crossed below its signal line (bearish).
    Dead,
}
