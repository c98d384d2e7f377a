//! Tick-to-bar reduction over completed windows.

use chrono::{DateTime, Utc};
use std::borrow::Cow;
use tickbars_types::{Rule, Tick, sort_by_timestamp};

use crate::Ohlcv;

/// Reduces ticks into one bar per non-empty window of `rule`.
///
/// Windows are left-closed and left-labeled. Within a window `open` and
/// `close` follow timestamp order, with ties kept in input order. Bars whose
/// prices are not all finite are dropped. The result is ascending by
/// `window_start`.
///
/// This is a pure function: the same ticks always give the same bars,
/// however the input was assembled.
#[must_use]
pub fn reduce_ticks(ticks: &[Tick], rule: Rule) -> Vec<Ohlcv> {
    let ticks: Cow<'_, [Tick]> = if ticks.is_sorted_by_key(|t| t.timestamp) {
        Cow::Borrowed(ticks)
    } else {
        let mut owned = ticks.to_vec();
        sort_by_timestamp(&mut owned);
        Cow::Owned(owned)
    };

    let mut bars = Vec::new();
    let mut current: Option<OhlcvBuilder> = None;

    for tick in ticks.iter() {
        let window_start = rule.window_start(tick.timestamp);

        if let Some(builder) = current
            .as_mut()
            .filter(|b| b.window_start == window_start)
        {
            builder.update(tick);
            continue;
        }

        // New window started, finish the old one
        if let Some(done) = current.replace(OhlcvBuilder::new(window_start, tick)) {
            bars.extend(done.finish());
        }
    }

    if let Some(done) = current {
        bars.extend(done.finish());
    }

    bars
}

/// Builder for OHLCV bars.
#[derive(Debug)]
struct OhlcvBuilder {
    window_start: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
}

impl OhlcvBuilder {
    /// Creates a new builder from the first tick.
    const fn new(window_start: DateTime<Utc>, tick: &Tick) -> Self {
        Self {
            window_start,
            open: tick.price,
            high: tick.price,
            low: tick.price,
            close: tick.price,
            volume: 1,
        }
    }

    /// Updates the builder with a new tick.
    fn update(&mut self, tick: &Tick) {
        self.high = self.high.max(tick.price);
        self.low = self.low.min(tick.price);
        self.close = tick.price;
        self.volume += 1;
    }

    /// Finishes building, or `None` if any price is not finite.
    fn finish(self) -> Option<Ohlcv> {
        let bar = Ohlcv::new(
            self.window_start,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
        );
        bar.is_finite().then_some(bar)
    }
}
