//! Raw row validation and normalization into canonical ticks.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tickbars_types::{ContractSymbol, PriceBounds, Tick, sort_by_timestamp};

use crate::RawBatch;

/// Default multiplier from fixed-point price units to prices (nanos).
pub const DEFAULT_PRICE_SCALE: f64 = 1e-9;

/// Naive layouts accepted as UTC when no offset is given.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Offset layouts accepted in addition to RFC 3339.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%#z"];

/// Counters for one or more sanitized batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizeStats {
    /// Raw rows examined.
    pub rows: u64,
    /// Rows with an unparseable timestamp or price.
    pub malformed: u64,
    /// Rows for another instrument.
    pub symbol_mismatch: u64,
    /// Rows outside the price bounds.
    pub out_of_bounds: u64,
}

impl SanitizeStats {
    /// Returns the number of rows that became ticks.
    #[must_use]
    pub const fn accepted(&self) -> u64 {
        self.rows - self.malformed - self.symbol_mismatch - self.out_of_bounds
    }

    /// Adds another set of counters to this one.
    pub const fn merge(&mut self, other: &Self) {
        self.rows += other.rows;
        self.malformed += other.malformed;
        self.symbol_mismatch += other.symbol_mismatch;
        self.out_of_bounds += other.out_of_bounds;
    }
}

/// Turns raw batches into sorted canonical ticks.
///
/// Stateless across batches: the symbol filter, bounds and price scale are
/// fixed once per run.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    symbol: Option<String>,
    bounds: PriceBounds,
    price_scale: f64,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self {
            symbol: None,
            bounds: PriceBounds::UNBOUNDED,
            price_scale: DEFAULT_PRICE_SCALE,
        }
    }
}

impl Sanitizer {
    /// Creates a sanitizer keeping only ticks for `contract`.
    #[must_use]
    pub fn new(contract: &ContractSymbol) -> Self {
        Self {
            symbol: Some(contract.to_string()),
            ..Self::default()
        }
    }

    /// Sets the price sanity bounds.
    #[must_use]
    pub const fn with_bounds(mut self, bounds: PriceBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Sets the fixed-point price multiplier.
    #[must_use]
    pub const fn with_price_scale(mut self, price_scale: f64) -> Self {
        self.price_scale = price_scale;
        self
    }

    /// Returns the symbol filter, if any.
    ///
    /// Without one, a batch's symbol column is ignored.
    #[must_use]
    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    /// Sanitizes one batch.
    ///
    /// Malformed rows, rows for another instrument and rows outside the
    /// bounds are dropped and counted. The returned ticks are sorted by
    /// timestamp; an empty result is legal.
    #[must_use]
    pub fn sanitize(&self, batch: &RawBatch) -> (Vec<Tick>, SanitizeStats) {
        let mut stats = SanitizeStats {
            rows: batch.len() as u64,
            ..SanitizeStats::default()
        };
        let filter = self.symbol.as_deref().filter(|_| batch.has_symbol);

        let mut ticks = Vec::with_capacity(batch.len());
        for row in &batch.rows {
            let parsed = parse_timestamp(&row.ts_event)
                .zip(parse_price(&row.price, self.price_scale));
            let Some((timestamp, price)) = parsed else {
                stats.malformed += 1;
                continue;
            };
            if let Some(symbol) = filter
                && row.symbol.as_deref() != Some(symbol)
            {
                stats.symbol_mismatch += 1;
                continue;
            }
            if !self.bounds.contains(price) {
                stats.out_of_bounds += 1;
                continue;
            }
            ticks.push(Tick::new(timestamp, price));
        }

        sort_by_timestamp(&mut ticks);
        (ticks, stats)
    }
}

/// Parses an event time into UTC, or `None` if it is not recognized.
///
/// Accepts RFC 3339 with any offset, and naive date-times which are taken
/// as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|naive| naive.and_utc())
        })
}

/// Converts a fixed-point price string, or `None` if it is not a finite number.
#[must_use]
pub fn parse_price(raw: &str, scale: f64) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .map(|units| units * scale)
        .filter(|price| price.is_finite())
}
