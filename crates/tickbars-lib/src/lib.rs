//! Streaming tick-to-OHLCV aggregation across many granularities.
//!
//! This is a facade crate that re-exports functionality from the tickbars
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use tickbars_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RunConfig::default().with_bounds(PriceBounds::new(Some(1000.0), None));
//!     let output = build_bars_from_path("NQ_2024_03.csv", &config).await?;
//!
//!     for (rule, series) in &output.series {
//!         println!("{rule}: {} bars", series.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The reduction itself needs no runtime:
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use tickbars_lib::prelude::*;
//!
//! let t0 = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
//! let ticks = [Tick::new(t0, 100.0), Tick::new(t0 + chrono::TimeDelta::seconds(90), 101.0)];
//! let bars = reduce_ticks(&ticks, "60s".parse().unwrap());
//! assert_eq!(bars.len(), 2);
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tickbars/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use tickbars_types::*;

// Re-export aggregation
pub use tickbars_aggregate::{
    AggregatedBars, BarAggregator, BarSeries, LatePolicy, Ohlcv, RuleBuffer, RuleStats,
    merge_bars, reduce_ticks,
};

// Re-export reading and the run driver
#[cfg(feature = "ingest")]
pub use tickbars_ingest::{
    AggregationOutput, BatchReader, CsvBatchReader, DEFAULT_BATCH_SIZE, DEFAULT_PRICE_SCALE,
    RawBatch, RawRow, RunConfig, RunProgress, RunStats, SanitizeStats, Sanitizer,
    VecBatchReader, build_bars, build_bars_from_path, build_bars_with_progress, parse_price,
    parse_timestamp,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use tickbars_format::{
    CsvFormatter, FormatError, Formatter, JsonFormatter, JsonStyle, OutputFormat,
};

#[cfg(all(feature = "format", feature = "parquet"))]
pub use tickbars_format::ParquetFormatter;

/// Prelude module for convenient imports.
///
/// ```
/// use tickbars_lib::prelude::*;
/// ```
pub mod prelude {
    pub use tickbars_types::{
        ContractSymbol, PriceBounds, Result, Rule, RunInput, Tick, TickbarsError, TimeframeMap,
    };

    pub use tickbars_aggregate::{BarAggregator, BarSeries, LatePolicy, Ohlcv, reduce_ticks};

    #[cfg(feature = "ingest")]
    pub use tickbars_ingest::{
        AggregationOutput, BatchReader, CsvBatchReader, RunConfig, RunProgress, RunStats,
        build_bars, build_bars_from_path, build_bars_with_progress,
    };

    #[cfg(feature = "format")]
    pub use tickbars_format::{CsvFormatter, Formatter, JsonFormatter, OutputFormat};

    #[cfg(all(feature = "format", feature = "parquet"))]
    pub use tickbars_format::ParquetFormatter;
}
