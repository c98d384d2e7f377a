//! Error types for tickbars.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{Rule, RuleParseError};

/// Result type alias for tickbars operations.
pub type Result<T> = std::result::Result<T, TickbarsError>;

/// Errors that abort an aggregation run.
///
/// Row-level defects never surface here; the sanitizer drops them.
#[derive(Error, Debug)]
pub enum TickbarsError {
    /// A granularity is not of the whole-second form.
    #[error(transparent)]
    InvalidRule(#[from] RuleParseError),

    /// A requested timeframe label is not configured.
    #[error("Unknown timeframe: {0}")]
    UnknownTimeframe(String),

    /// The input file name does not identify an instrument, year and month.
    #[error("Invalid file name '{0}', expected ROOT_YYYY_MM.csv")]
    InvalidFileName(String),

    /// Month outside 1 to 12.
    #[error("Invalid month: {0}")]
    InvalidMonth(u32),

    /// Run configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required input column is absent.
    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),

    /// The batch reader failed mid-stream.
    #[error("Read error: {0}")]
    Read(String),

    /// A tick arrived for a window that was already finalized.
    #[error("Late tick at {timestamp} for rule {rule}, watermark already at {watermark}")]
    LateTick {
        /// Granularity whose watermark was passed.
        rule: Rule,
        /// Timestamp of the late tick.
        timestamp: DateTime<Utc>,
        /// The rule's finalize watermark when the tick arrived.
        watermark: DateTime<Utc>,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
