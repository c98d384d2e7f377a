//! Core types for the tickbars tick-to-OHLCV aggregator.
//!
//! This crate provides the fundamental data structures used throughout tickbars:
//!
//! - [`Tick`] - A canonical `(timestamp, price)` observation
//! - [`Rule`] - A fixed, whole-second bar granularity
//! - [`TimeframeMap`] - Human-facing timeframe labels mapped to rules
//! - [`PriceBounds`] - Inclusive price sanity bounds
//! - [`ContractSymbol`] - Futures contract code used as the symbol filter
//! - [`RunInput`] - Root, year and month parsed from an input file name

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tickbars/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bounds;
mod contract;
mod error;
mod rule;
mod tick;

pub use bounds::PriceBounds;
pub use contract::{ContractSymbol, RunInput};
pub use error::{Result, TickbarsError};
pub use rule::{Rule, RuleParseError, TimeframeMap};
pub use tick::{Tick, sort_by_timestamp};
