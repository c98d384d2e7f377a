//! OHLCV (candlestick) data structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar (candlestick) data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlcv {
    /// Start of the window (left label).
    #[serde(rename = "timestamp")]
    pub window_start: DateTime<Utc>,
    /// Opening price (first tick's price).
    pub open: f64,
    /// Highest price during the window.
    pub high: f64,
    /// Lowest price during the window.
    pub low: f64,
    /// Closing price (last tick's price).
    pub close: f64,
    /// Number of ticks folded into the bar.
    pub volume: i64,
}

impl Ohlcv {
    /// Creates a new OHLCV bar.
    #[must_use]
    pub const fn new(
        window_start: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: i64,
    ) -> Self {
        Self {
            window_start,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns true if every price is finite.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.open.is_finite() && self.high.is_finite() && self.low.is_finite() && self.close.is_finite()
    }

    /// Returns true if `low <= min(open, close)` and `max(open, close) <= high`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.low <= self.open.min(self.close) && self.open.max(self.close) <= self.high
    }
}
