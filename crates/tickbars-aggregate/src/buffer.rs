//! Per-granularity rolling buffer with watermark finalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tickbars_types::{Rule, Tick, TickbarsError, sort_by_timestamp};
use tracing::{debug, warn};

use crate::{Ohlcv, reduce_ticks};

/// What to do with a tick older than a granularity's finalize watermark.
///
/// Such a tick belongs to a window that may already have been turned into a
/// bar. Bars are never revised once finalized. "Late" means behind the
/// watermark, not behind an emitted bar: a tick for a window that never
/// produced a bar is still late once the watermark has passed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatePolicy {
    /// Discard the tick and count it.
    #[default]
    Drop,
    /// Abort the run.
    Reject,
}

impl LatePolicy {
    /// Returns the policy name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Reject => "reject",
        }
    }
}

impl std::fmt::Display for LatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LatePolicy {
    type Err = TickbarsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "reject" => Ok(Self::Reject),
            _ => Err(TickbarsError::Config(format!(
                "unknown late policy '{s}', expected drop or reject"
            ))),
        }
    }
}

/// Rolling state for one granularity.
///
/// Holds the timestamp-sorted tail of ticks whose window may still receive
/// more ticks, plus every bar finalized so far. The watermark is the start of
/// the window containing the newest tick seen; everything before it is
/// complete.
#[derive(Debug)]
pub struct RuleBuffer {
    rule: Rule,
    pending: Vec<Tick>,
    bars: Vec<Ohlcv>,
    watermark: Option<DateTime<Utc>>,
    late_ticks: u64,
}

impl RuleBuffer {
    /// Creates an empty buffer for `rule`.
    #[must_use]
    pub const fn new(rule: Rule) -> Self {
        Self {
            rule,
            pending: Vec::new(),
            bars: Vec::new(),
            watermark: None,
            late_ticks: 0,
        }
    }

    /// Returns the granularity this buffer aggregates to.
    #[must_use]
    pub const fn rule(&self) -> Rule {
        self.rule
    }

    /// Returns the current finalize watermark, if any tick was seen.
    #[must_use]
    pub const fn watermark(&self) -> Option<DateTime<Utc>> {
        self.watermark
    }

    /// Returns the ticks not yet finalized.
    #[must_use]
    pub fn pending(&self) -> &[Tick] {
        &self.pending
    }

    /// Returns the bars finalized so far, in finalize order.
    #[must_use]
    pub fn bars(&self) -> &[Ohlcv] {
        &self.bars
    }

    /// Returns how many late ticks were dropped.
    #[must_use]
    pub const fn late_ticks(&self) -> u64 {
        self.late_ticks
    }

    /// Merges a batch of ticks and finalizes every complete window.
    ///
    /// The batch need not be sorted. Returns the number of bars finalized by
    /// this call.
    ///
    /// # Errors
    ///
    /// Returns [`TickbarsError::LateTick`] under [`LatePolicy::Reject`] when a
    /// tick is older than the current watermark.
    pub fn ingest(&mut self, ticks: &[Tick], policy: LatePolicy) -> Result<usize, TickbarsError> {
        match self.watermark {
            Some(watermark) => {
                for tick in ticks {
                    if tick.timestamp >= watermark {
                        self.pending.push(*tick);
                        continue;
                    }
                    match policy {
                        LatePolicy::Drop => self.late_ticks += 1,
                        LatePolicy::Reject => {
                            return Err(TickbarsError::LateTick {
                                rule: self.rule,
                                timestamp: tick.timestamp,
                                watermark,
                            });
                        }
                    }
                }
            }
            None => self.pending.extend_from_slice(ticks),
        }

        sort_by_timestamp(&mut self.pending);

        let Some(latest) = self.pending.last() else {
            return Ok(0);
        };
        let watermark = self.rule.window_start(latest.timestamp);
        self.watermark = Some(watermark);

        let split = self.pending.partition_point(|t| t.timestamp < watermark);
        if split == 0 {
            return Ok(0);
        }

        let finalized: Vec<Tick> = self.pending.drain(..split).collect();
        let bars = reduce_ticks(&finalized, self.rule);
        debug!(
            rule = %self.rule,
            %watermark,
            ticks = finalized.len(),
            bars = bars.len(),
            pending = self.pending.len(),
            "finalized windows"
        );

        let emitted = bars.len();
        self.bars.extend(bars);
        Ok(emitted)
    }

    /// Reduces whatever is still buffered, unconditionally.
    ///
    /// Returns the number of bars produced. Calling it again is a no-op.
    pub fn flush(&mut self) -> usize {
        if self.pending.is_empty() {
            return 0;
        }
        let remaining = std::mem::take(&mut self.pending);
        let bars = reduce_ticks(&remaining, self.rule);
        debug!(rule = %self.rule, ticks = remaining.len(), bars = bars.len(), "flushed buffer");

        let emitted = bars.len();
        self.bars.extend(bars);
        emitted
    }

    /// Consumes the buffer, returning the finalized bars.
    ///
    /// Ticks still pending are discarded; call [`Self::flush`] first.
    #[must_use]
    pub fn into_bars(self) -> Vec<Ohlcv> {
        if self.late_ticks > 0 {
            warn!(rule = %self.rule, late_ticks = self.late_ticks, "dropped late ticks");
        }
        self.bars
    }
}
