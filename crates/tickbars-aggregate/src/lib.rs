//! Streaming multi-granularity OHLCV aggregation for tickbars.
//!
//! This crate turns batches of canonical ticks into bars:
//!
//! - [`Ohlcv`] - OHLCV bar data structure
//! - [`reduce_ticks`] - Pure tick-to-bar reduction over fixed windows
//! - [`RuleBuffer`] - Per-granularity buffer with watermark finalization
//! - [`BarAggregator`] - Drives every granularity's buffer batch by batch
//! - [`merge_bars`] - Final sort and deduplication into a [`BarSeries`]

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tickbars/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregator;
mod buffer;
mod merge;
mod ohlcv;
mod reducer;

pub use aggregator::{AggregatedBars, BarAggregator, RuleStats};
pub use buffer::{LatePolicy, RuleBuffer};
pub use merge::{BarSeries, merge_bars};
pub use ohlcv::Ohlcv;
pub use reducer::reduce_ticks;
