//! Batch reader abstraction.

use async_trait::async_trait;
use std::collections::VecDeque;
use tickbars_types::Result;

use crate::RawBatch;

/// Source of raw tick batches.
///
/// Batches are pulled one at a time, in order, until `Ok(None)` signals the
/// end of input. An `Err` is fatal for the run.
#[async_trait]
pub trait BatchReader: Send {
    /// Reads the next batch, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying source fails.
    async fn next_batch(&mut self) -> Result<Option<RawBatch>>;
}

/// In-memory reader over pre-built batches.
#[derive(Debug, Clone, Default)]
pub struct VecBatchReader {
    batches: VecDeque<RawBatch>,
}

impl VecBatchReader {
    /// Creates a reader yielding `batches` in order.
    #[must_use]
    pub fn new(batches: impl IntoIterator<Item = RawBatch>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
        }
    }
}

#[async_trait]
impl BatchReader for VecBatchReader {
    async fn next_batch(&mut self) -> Result<Option<RawBatch>> {
        Ok(self.batches.pop_front())
    }
}
