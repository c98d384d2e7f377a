//! Batched CSV tick reader.

use async_trait::async_trait;
use csv_async::{AsyncReader, AsyncReaderBuilder, StringRecord, Trim};
use std::path::Path;
use tickbars_types::{Result, TickbarsError};
use tokio::fs::File;
use tokio::io::{AsyncRead, BufReader};
use tracing::debug;

use crate::{BatchReader, RawBatch, RawRow};

/// Default number of rows per batch.
pub const DEFAULT_BATCH_SIZE: usize = 200_000;

/// Column holding the event time.
const TS_EVENT: &str = "ts_event";
/// Column holding the fixed-point price.
const PRICE: &str = "price";
/// Optional column holding the instrument symbol.
const SYMBOL: &str = "symbol";

/// Positions of the columns the pipeline reads.
#[derive(Debug, Clone, Copy)]
struct Columns {
    ts_event: usize,
    price: usize,
    symbol: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        Ok(Self {
            ts_event: find(TS_EVENT).ok_or(TickbarsError::MissingColumn(TS_EVENT))?,
            price: find(PRICE).ok_or(TickbarsError::MissingColumn(PRICE))?,
            symbol: find(SYMBOL),
        })
    }
}

/// Reads a headered CSV file of ticks in fixed-size batches.
///
/// Requires `ts_event` and `price` columns; `symbol` is optional. Other
/// columns are ignored. Short rows yield empty fields, which the sanitizer
/// later drops.
pub struct CsvBatchReader<R> {
    reader: AsyncReader<R>,
    columns: Columns,
    batch_size: usize,
    record: StringRecord,
    rows_read: u64,
    exhausted: bool,
}

impl<R> std::fmt::Debug for CsvBatchReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvBatchReader")
            .field("columns", &self.columns)
            .field("batch_size", &self.batch_size)
            .field("rows_read", &self.rows_read)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

impl CsvBatchReader<BufReader<File>> {
    /// Opens a CSV file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or lacks a required
    /// column.
    pub async fn open(path: impl AsRef<Path>, batch_size: usize) -> Result<Self> {
        let file = File::open(path.as_ref()).await?;
        Self::new(BufReader::new(file), batch_size).await
    }
}

impl<R> CsvBatchReader<R>
where
    R: AsyncRead + Unpin + Send,
{
    /// Wraps an async source, reading its header row.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be read, a required column is
    /// missing, or `batch_size` is zero.
    pub async fn new(source: R, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(TickbarsError::Config("batch size must be positive".into()));
        }

        let mut reader = AsyncReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .create_reader(source);
        let headers = reader.headers().await.map_err(read_error)?;
        let columns = Columns::from_headers(headers)?;
        debug!(?columns, batch_size, "opened csv source");

        Ok(Self {
            reader,
            columns,
            batch_size,
            record: StringRecord::new(),
            rows_read: 0,
            exhausted: false,
        })
    }

    /// Returns whether the source has a symbol column.
    #[must_use]
    pub const fn has_symbol(&self) -> bool {
        self.columns.symbol.is_some()
    }

    /// Returns the number of data rows read so far.
    #[must_use]
    pub const fn rows_read(&self) -> u64 {
        self.rows_read
    }

    fn row_from_record(&self) -> RawRow {
        let field = |idx: usize| self.record.get(idx).unwrap_or_default().to_string();
        RawRow {
            ts_event: field(self.columns.ts_event),
            price: field(self.columns.price),
            symbol: self.columns.symbol.map(field),
        }
    }
}

#[async_trait]
impl<R> BatchReader for CsvBatchReader<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn next_batch(&mut self) -> Result<Option<RawBatch>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut rows = Vec::with_capacity(self.batch_size.min(DEFAULT_BATCH_SIZE));
        while rows.len() < self.batch_size {
            let more = self
                .reader
                .read_record(&mut self.record)
                .await
                .map_err(read_error)?;
            if !more {
                self.exhausted = true;
                break;
            }
            rows.push(self.row_from_record());
        }

        self.rows_read += rows.len() as u64;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(RawBatch::new(rows, self.has_symbol())))
    }
}

fn read_error(err: csv_async::Error) -> TickbarsError {
    TickbarsError::Read(err.to_string())
}
