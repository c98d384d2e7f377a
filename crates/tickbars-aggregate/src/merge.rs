//! Cross-batch merge and deduplication of finalized bars.

use serde::{Deserialize, Serialize};
use std::ops::Deref;

use crate::Ohlcv;

/// A final bar series for one granularity.
///
/// Ascending by `window_start`, with at most one bar per window. May be
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BarSeries(Vec<Ohlcv>);

impl BarSeries {
    /// Returns the bars as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Ohlcv] {
        &self.0
    }

    /// Consumes the series, returning the bars.
    #[must_use]
    pub fn into_vec(self) -> Vec<Ohlcv> {
        self.0
    }
}

impl Deref for BarSeries {
    type Target = [Ohlcv];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a BarSeries {
    type Item = &'a Ohlcv;
    type IntoIter = std::slice::Iter<'a, Ohlcv>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Merges the bars finalized across a run into a single series.
///
/// Bars are stably sorted by `window_start`; when a window appears more than
/// once the one appended last wins. Returns the series and the number of
/// duplicates removed, which should be zero when the watermark held.
#[must_use]
pub fn merge_bars(mut bars: Vec<Ohlcv>) -> (BarSeries, usize) {
    bars.sort_by_key(|bar| bar.window_start);

    let before = bars.len();
    let mut merged: Vec<Ohlcv> = Vec::with_capacity(before);
    for bar in bars {
        if let Some(last) = merged
            .last_mut()
            .filter(|last| last.window_start == bar.window_start)
        {
            *last = bar;
        } else {
            merged.push(bar);
        }
    }
    let duplicates = before - merged.len();

    (BarSeries(merged), duplicates)
}
