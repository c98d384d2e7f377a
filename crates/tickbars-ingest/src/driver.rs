//! End-to-end aggregation runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tickbars_aggregate::{BarAggregator, BarSeries, LatePolicy, RuleStats};
use tickbars_types::{
    ContractSymbol, PriceBounds, Result, Rule, RunInput, TickbarsError, TimeframeMap,
};
use tracing::{debug, info};

use crate::{
    BatchReader, CsvBatchReader, DEFAULT_BATCH_SIZE, DEFAULT_PRICE_SCALE, SanitizeStats,
    Sanitizer,
};

/// Configuration for one aggregation run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Rows per batch read from the source.
    pub batch_size: usize,
    /// Price sanity bounds.
    pub bounds: PriceBounds,
    /// Multiplier from fixed-point price units to prices.
    pub price_scale: f64,
    /// Timeframe labels and their granularities.
    pub timeframes: TimeframeMap,
    /// Handling of ticks behind a granularity's watermark.
    pub late_policy: LatePolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            bounds: PriceBounds::UNBOUNDED,
            price_scale: DEFAULT_PRICE_SCALE,
            timeframes: TimeframeMap::default(),
            late_policy: LatePolicy::default(),
        }
    }
}

impl RunConfig {
    /// Sets the batch size.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
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

    /// Sets the timeframe map.
    #[must_use]
    pub fn with_timeframes(mut self, timeframes: TimeframeMap) -> Self {
        self.timeframes = timeframes;
        self
    }

    /// Sets the late-data policy.
    #[must_use]
    pub const fn with_late_policy(mut self, late_policy: LatePolicy) -> Self {
        self.late_policy = late_policy;
        self
    }

    /// Checks the configuration before any input is read.
    ///
    /// # Errors
    ///
    /// Returns [`TickbarsError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(TickbarsError::Config("batch size must be positive".into()));
        }
        if !(self.price_scale.is_finite() && self.price_scale > 0.0) {
            return Err(TickbarsError::Config(format!(
                "price scale must be a positive number, got {}",
                self.price_scale
            )));
        }
        if self.timeframes.is_empty() {
            return Err(TickbarsError::Config("no timeframes configured".into()));
        }
        if let (Some(min), Some(max)) = (self.bounds.min, self.bounds.max)
            && min > max
        {
            return Err(TickbarsError::Config(format!(
                "minimum price {min} is above maximum price {max}"
            )));
        }
        Ok(())
    }
}

/// Counters for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Batches read from the source.
    pub batches: u64,
    /// Batches with no ticks left after sanitizing.
    pub skipped_batches: u64,
    /// Sanitizer counters summed over all batches.
    pub sanitize: SanitizeStats,
    /// Per-granularity counters.
    pub rules: BTreeMap<Rule, RuleStats>,
}

impl RunStats {
    /// Returns the number of ticks that passed the sanitizer.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.sanitize.accepted()
    }

    /// Returns the total number of late ticks dropped across all rules.
    #[must_use]
    pub fn late_ticks(&self) -> u64 {
        self.rules.values().map(|s| s.late_ticks).sum()
    }

    /// Returns the total number of windows removed by deduplication.
    #[must_use]
    pub fn duplicate_windows(&self) -> usize {
        self.rules.values().map(|s| s.duplicate_windows).sum()
    }
}

/// Progress snapshot passed to the callback after each batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunProgress {
    /// Batches read so far.
    pub batches: u64,
    /// Raw rows read so far.
    pub rows: u64,
    /// Ticks accepted so far.
    pub ticks: u64,
    /// Ticks currently buffered across all granularities.
    pub buffered: usize,
}

/// The complete result of a run.
#[derive(Debug, Clone)]
pub struct AggregationOutput {
    /// Contract the ticks were filtered to.
    pub contract: ContractSymbol,
    /// Final bar series for every configured granularity.
    pub series: BTreeMap<Rule, BarSeries>,
    /// Run counters.
    pub stats: RunStats,
}

impl AggregationOutput {
    /// Returns the series for a granularity.
    #[must_use]
    pub fn get(&self, rule: Rule) -> Option<&BarSeries> {
        self.series.get(&rule)
    }

    /// Returns the series for a timeframe label of `timeframes`.
    #[must_use]
    pub fn for_label(&self, timeframes: &TimeframeMap, label: &str) -> Option<&BarSeries> {
        timeframes.rule_for(label).and_then(|rule| self.get(rule))
    }
}

/// Runs the pipeline over `reader` until it is exhausted.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the reader fails, or a
/// late tick is found under [`LatePolicy::Reject`]. No partial output is
/// returned.
pub async fn build_bars<R>(
    reader: &mut R,
    input: &RunInput,
    config: &RunConfig,
) -> Result<AggregationOutput>
where
    R: BatchReader + ?Sized,
{
    build_bars_with_progress(reader, input, config, |_| {}).await
}

/// Runs the pipeline, calling `on_batch` after every batch.
///
/// # Errors
///
/// See [`build_bars`].
pub async fn build_bars_with_progress<R, F>(
    reader: &mut R,
    input: &RunInput,
    config: &RunConfig,
    mut on_batch: F,
) -> Result<AggregationOutput>
where
    R: BatchReader + ?Sized,
    F: FnMut(&RunProgress),
{
    config.validate()?;
    let contract = input.contract()?;
    let sanitizer = Sanitizer::new(&contract)
        .with_bounds(config.bounds)
        .with_price_scale(config.price_scale);
    let mut aggregator = BarAggregator::new(config.timeframes.rules(), config.late_policy);

    info!(
        %contract,
        rules = config.timeframes.rules().len(),
        batch_size = config.batch_size,
        late_policy = %config.late_policy,
        "starting aggregation run"
    );

    let mut stats = RunStats::default();
    while let Some(batch) = reader.next_batch().await? {
        stats.batches += 1;
        let (ticks, batch_stats) = sanitizer.sanitize(&batch);
        stats.sanitize.merge(&batch_stats);

        if ticks.is_empty() {
            stats.skipped_batches += 1;
            debug!(batch = stats.batches, rows = batch.len(), "no ticks left, skipping batch");
        } else {
            let finalized = aggregator.ingest(&ticks)?;
            debug!(
                batch = stats.batches,
                rows = batch.len(),
                ticks = ticks.len(),
                finalized,
                buffered = aggregator.buffered_ticks(),
                "processed batch"
            );
        }

        on_batch(&RunProgress {
            batches: stats.batches,
            rows: stats.sanitize.rows,
            ticks: stats.ticks(),
            buffered: aggregator.buffered_ticks(),
        });
    }

    let finished = aggregator.finish();
    stats.rules = finished.stats;

    info!(
        %contract,
        batches = stats.batches,
        rows = stats.sanitize.rows,
        ticks = stats.ticks(),
        late_ticks = stats.late_ticks(),
        "aggregation run complete"
    );

    Ok(AggregationOutput {
        contract,
        series: finished.series,
        stats,
    })
}

/// Runs the pipeline over a CSV file named like `NQ_2024_03.csv`.
///
/// The instrument, year and month come from the file name.
///
/// # Errors
///
/// Returns an error if the file name is not recognized, the configuration is
/// invalid, or reading fails.
pub async fn build_bars_from_path(
    path: impl AsRef<Path>,
    config: &RunConfig,
) -> Result<AggregationOutput> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| TickbarsError::InvalidFileName(path.display().to_string()))?;
    let input = RunInput::from_file_name(name)?;
    config.validate()?;

    let mut reader = CsvBatchReader::open(path, config.batch_size).await?;
    build_bars(&mut reader, &input, config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RawBatch, RawRow, VecBatchReader};
    use approx::assert_relative_eq;
    use async_trait::async_trait;
    use tempfile::TempDir;

    fn input() -> RunInput {
        RunInput::new("NQ", 2024, 3).unwrap()
    }

    fn minute_config() -> RunConfig {
        RunConfig::default()
            .with_timeframes(TimeframeMap::parse_pairs([("1m", "60s")]).unwrap())
            .with_price_scale(1.0)
    }

    fn row(ts: &str, price: &str) -> RawRow {
        RawRow::new(ts, price).with_symbol("NQH4")
    }

    /// Fails after yielding its batches.
    struct FailingReader(VecBatchReader);

    #[async_trait]
    impl BatchReader for FailingReader {
        async fn next_batch(&mut self) -> Result<Option<RawBatch>> {
            match self.0.next_batch().await? {
                Some(batch) => Ok(Some(batch)),
                None => Err(TickbarsError::Read("connection reset".into())),
            }
        }
    }

    #[tokio::test]
    async fn test_end_to_end_example_across_batches() {
        let mut reader = VecBatchReader::new([
            RawBatch::new(
                vec![
                    row("2024-03-04T09:00:00.900Z", "101.0"),
                    row("2024-03-04T09:00:00.100Z", "100.0"),
                ],
                true,
            ),
            RawBatch::new(vec![row("2024-03-04T09:00:01.200Z", "99.5")], true),
            RawBatch::new(vec![row("2024-03-04T09:01:05.000Z", "102.0")], true),
        ]);
        let out = build_bars(&mut reader, &input(), &minute_config())
            .await
            .unwrap();

        let bars = &out.series[&Rule::from_seconds(60).unwrap()];
        assert_eq!(bars.len(), 2);
        assert_eq!(
            (bars[0].open, bars[0].high, bars[0].low, bars[0].close, bars[0].volume),
            (100.0, 101.0, 99.5, 99.5, 3)
        );
        assert_eq!(
            (bars[1].open, bars[1].high, bars[1].low, bars[1].close, bars[1].volume),
            (102.0, 102.0, 102.0, 102.0, 1)
        );
        assert_eq!(out.stats.batches, 3);
        assert_eq!(out.contract.to_string(), "NQH4");
    }

    #[tokio::test]
    async fn test_empty_batches_are_skipped() {
        let mut reader = VecBatchReader::new([
            RawBatch::new(vec![RawRow::new("2024-03-04T09:00:00Z", "1").with_symbol("ESH4")], true),
            RawBatch::new(vec![row("bad", "1")], true),
            RawBatch::new(vec![row("2024-03-04T09:00:00Z", "5")], true),
        ]);
        let mut seen = Vec::new();
        let out = build_bars_with_progress(&mut reader, &input(), &minute_config(), |p| {
            seen.push(*p);
        })
        .await
        .unwrap();

        assert_eq!(out.stats.skipped_batches, 2);
        assert_eq!(out.stats.sanitize.symbol_mismatch, 1);
        assert_eq!(out.stats.sanitize.malformed, 1);
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2].ticks, 1);
        assert_eq!(seen[2].buffered, 1);
    }

    #[tokio::test]
    async fn test_every_rule_present_without_ticks() {
        let mut reader = VecBatchReader::default();
        let out = build_bars(&mut reader, &input(), &RunConfig::default())
            .await
            .unwrap();

        assert_eq!(out.series.len(), 9);
        assert!(out.series.values().all(|s| s.is_empty()));
        let one_day = TimeframeMap::default();
        assert!(out.for_label(&one_day, "1d").is_some());
    }

    #[tokio::test]
    async fn test_reader_failure_aborts_run() {
        let mut reader = FailingReader(VecBatchReader::new([RawBatch::new(
            vec![row("2024-03-04T09:00:00Z", "5")],
            true,
        )]));
        let err = build_bars(&mut reader, &input(), &minute_config())
            .await
            .unwrap_err();
        assert!(matches!(err, TickbarsError::Read(_)));
    }

    #[tokio::test]
    async fn test_invalid_config_fails_before_reading() {
        let mut reader = FailingReader(VecBatchReader::default());
        let config = minute_config().with_bounds(PriceBounds::new(Some(10.0), Some(1.0)));
        let err = build_bars(&mut reader, &input(), &config).await.unwrap_err();
        assert!(matches!(err, TickbarsError::Config(_)));

        let config = minute_config().with_batch_size(0);
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_late_tick_rejected_fails_run() {
        let mut reader = VecBatchReader::new([
            RawBatch::new(vec![row("2024-03-04T09:05:00Z", "1")], true),
            RawBatch::new(vec![row("2024-03-04T09:01:00Z", "2")], true),
        ]);
        let config = minute_config().with_late_policy(LatePolicy::Reject);
        let err = build_bars(&mut reader, &input(), &config).await.unwrap_err();
        assert!(matches!(err, TickbarsError::LateTick { .. }));
    }

    #[tokio::test]
    async fn test_from_path_filters_contract_and_scales_prices() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("NQ_2024_03.csv");
        std::fs::write(
            &path,
            "ts_event,rtype,symbol,price\n\
             2024-03-04T09:00:00.100Z,0,NQH4,100000000000\n\
             2024-03-04T09:00:00.900Z,0,NQH4,101000000000\n\
             2024-03-04T09:00:01.000Z,0,NQM4,500000000000\n\
             2024-03-04T09:00:01.200Z,0,NQH4,99500000000\n\
             2024-03-04T09:01:05.000Z,0,NQH4,102000000000\n",
        )
        .unwrap();

        let config = RunConfig::default()
            .with_timeframes(TimeframeMap::parse_pairs([("1m", "60s")]).unwrap())
            .with_batch_size(2);
        let out = build_bars_from_path(&path, &config).await.unwrap();

        let bars = &out.series[&Rule::from_seconds(60).unwrap()];
        assert_eq!(bars.len(), 2);
        assert_relative_eq!(bars[0].open, 100.0, max_relative = 1e-12);
        assert_relative_eq!(bars[0].high, 101.0, max_relative = 1e-12);
        assert_relative_eq!(bars[0].low, 99.5, max_relative = 1e-12);
        assert_relative_eq!(bars[0].close, 99.5, max_relative = 1e-12);
        assert_eq!(bars[0].volume, 3);
        assert_eq!(bars[1].volume, 1);
        assert_eq!(out.stats.batches, 3);
        assert_eq!(out.stats.sanitize.symbol_mismatch, 1);
    }

    #[tokio::test]
    async fn test_from_path_rejects_unrecognized_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ticks.csv");
        std::fs::write(&path, "ts_event,price\n").unwrap();

        let err = build_bars_from_path(&path, &RunConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TickbarsError::InvalidFileName(_)));
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = build_bars_from_path(temp_dir.path().join("ES_2024_06.csv"), &RunConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TickbarsError::Io(_)));
    }

    #[tokio::test]
    async fn test_late_tick_dropped_and_counted() {
        let mut reader = VecBatchReader::new([
            RawBatch::new(vec![row("2024-03-04T09:05:00Z", "1")], true),
            RawBatch::new(vec![row("2024-03-04T09:01:00Z", "2")], true),
        ]);
        let out = build_bars(&mut reader, &input(), &minute_config())
            .await
            .unwrap();
        assert_eq!(out.stats.late_ticks(), 1);
        assert_eq!(out.series.values().next().unwrap().len(), 1);
    }
}
