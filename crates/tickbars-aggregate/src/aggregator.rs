//! Multi-granularity streaming aggregation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tickbars_types::{Rule, Tick, TickbarsError};
use tracing::warn;

use crate::{BarSeries, LatePolicy, RuleBuffer, merge_bars};

/// Streaming aggregator feeding every configured granularity.
///
/// Owns one [`RuleBuffer`] per distinct rule. Batches go to every buffer in
/// arrival order; [`Self::finish`] flushes and merges them.
#[derive(Debug)]
pub struct BarAggregator {
    buffers: Vec<RuleBuffer>,
    policy: LatePolicy,
}

impl BarAggregator {
    /// Creates an aggregator for the given rules.
    ///
    /// Duplicate rules share a single buffer.
    #[must_use]
    pub fn new(rules: impl IntoIterator<Item = Rule>, policy: LatePolicy) -> Self {
        let mut rules: Vec<Rule> = rules.into_iter().collect();
        rules.sort_unstable();
        rules.dedup();

        Self {
            buffers: rules.into_iter().map(RuleBuffer::new).collect(),
            policy,
        }
    }

    /// Returns the rules being aggregated, ascending.
    pub fn rules(&self) -> impl Iterator<Item = Rule> + '_ {
        self.buffers.iter().map(RuleBuffer::rule)
    }

    /// Returns the late-data policy.
    #[must_use]
    pub const fn policy(&self) -> LatePolicy {
        self.policy
    }

    /// Returns the total number of ticks buffered across all rules.
    #[must_use]
    pub fn buffered_ticks(&self) -> usize {
        self.buffers.iter().map(|b| b.pending().len()).sum()
    }

    /// Feeds one sanitized batch to every granularity.
    ///
    /// An empty batch touches no buffer. Returns the number of bars
    /// finalized across all rules.
    ///
    /// # Errors
    ///
    /// Returns an error if a late tick is found under [`LatePolicy::Reject`].
    pub fn ingest(&mut self, ticks: &[Tick]) -> Result<usize, TickbarsError> {
        if ticks.is_empty() {
            return Ok(0);
        }
        let mut emitted = 0;
        for buffer in &mut self.buffers {
            emitted += buffer.ingest(ticks, self.policy)?;
        }
        Ok(emitted)
    }

    /// Flushes every buffer and merges each rule's bars into a final series.
    ///
    /// Every rule appears in the result, with an empty series if it never
    /// produced a bar.
    #[must_use]
    pub fn finish(self) -> AggregatedBars {
        let mut series = BTreeMap::new();
        let mut stats = BTreeMap::new();

        for mut buffer in self.buffers {
            buffer.flush();
            let rule = buffer.rule();
            let late_ticks = buffer.late_ticks();
            let (merged, duplicate_windows) = merge_bars(buffer.into_bars());

            if duplicate_windows > 0 {
                warn!(
                    %rule,
                    duplicate_windows,
                    "window finalized more than once, keeping the last bar"
                );
            }

            stats.insert(
                rule,
                RuleStats {
                    bars: merged.len(),
                    late_ticks,
                    duplicate_windows,
                },
            );
            series.insert(rule, merged);
        }

        AggregatedBars { series, stats }
    }
}

/// Per-rule counters gathered while aggregating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleStats {
    /// Bars in the final series.
    pub bars: usize,
    /// Ticks dropped for arriving behind the watermark.
    pub late_ticks: u64,
    /// Windows removed by deduplication.
    pub duplicate_windows: usize,
}

/// Final bar series and counters for every rule.
#[derive(Debug, Clone, Default)]
pub struct AggregatedBars {
    /// Final series keyed by rule.
    pub series: BTreeMap<Rule, BarSeries>,
    /// Counters keyed by rule.
    pub stats: BTreeMap<Rule, RuleStats>,
}
