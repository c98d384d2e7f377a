//! Raw tick rows as delivered by a batch reader.

/// One raw row: event time, fixed-point price and optional symbol, as text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRow {
    /// Event time string (e.g., `2024-03-04T09:00:00.123456789Z`).
    pub ts_event: String,
    /// Price in the source's fixed-point representation.
    pub price: String,
    /// Instrument symbol, if the source carries one.
    pub symbol: Option<String>,
}

impl RawRow {
    /// Creates a row without a symbol.
    #[must_use]
    pub fn new(ts_event: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            ts_event: ts_event.into(),
            price: price.into(),
            symbol: None,
        }
    }

    /// Sets the symbol.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

/// A batch of raw rows read in one step.
#[derive(Debug, Clone, Default)]
pub struct RawBatch {
    /// The rows in this batch.
    pub rows: Vec<RawRow>,
    /// Whether the source has a symbol column.
    pub has_symbol: bool,
}

impl RawBatch {
    /// Creates a new batch.
    #[must_use]
    pub const fn new(rows: Vec<RawRow>, has_symbol: bool) -> Self {
        Self { rows, has_symbol }
    }

    /// Returns true if the batch is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows in the batch.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }
}
