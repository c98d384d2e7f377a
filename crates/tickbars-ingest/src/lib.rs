//! Batch reading, sanitizing and the end-to-end aggregation driver.
//!
//! - [`BatchReader`] - Async source of raw row batches
//! - [`CsvBatchReader`] - Headered CSV files read in fixed-size batches
//! - [`Sanitizer`] - Raw rows to sorted canonical ticks
//! - [`build_bars`] - Full run from a reader to final bar series

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tickbars/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod batch;
mod csv;
mod driver;
mod reader;
mod sanitize;

pub use batch::{RawBatch, RawRow};
pub use csv::{CsvBatchReader, DEFAULT_BATCH_SIZE};
pub use driver::{
    AggregationOutput, RunConfig, RunProgress, RunStats, build_bars, build_bars_from_path,
    build_bars_with_progress,
};
pub use reader::{BatchReader, VecBatchReader};
pub use sanitize::{DEFAULT_PRICE_SCALE, SanitizeStats, Sanitizer, parse_price, parse_timestamp};
