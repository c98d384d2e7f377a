//! Tick data representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single canonical price observation.
///
/// Ticks only exist after sanitizing: the timestamp is in UTC, the price has
/// been converted from its fixed-point wire form and passed the run's
/// symbol and bounds filters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Timestamp of the tick (UTC).
    pub timestamp: DateTime<Utc>,
    /// Mid price.
    pub price: f64,
}

impl Tick {
    /// Creates a new tick.
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Sorts ticks ascending by timestamp.
///
/// The sort is stable: ticks sharing a timestamp keep their arrival order,
/// which decides `open`/`close` for a window.
pub fn sort_by_timestamp(ticks: &mut [Tick]) {
    ticks.sort_by_key(|tick| tick.timestamp);
}
