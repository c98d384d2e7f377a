//! Build command implementation.
//!
//! Runs the aggregation pipeline over one tick file and writes one output
//! file per requested timeframe.

use crate::display::{Format, load_timeframes, output_path, write_series};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tickbars_lib::prelude::*;
use tracing::info;

/// Arguments of the build command.
#[derive(Debug)]
pub(crate) struct BuildArgs {
    pub(crate) file: PathBuf,
    pub(crate) name: Option<String>,
    pub(crate) bounds: PriceBounds,
    pub(crate) timeframes: Vec<String>,
    pub(crate) timeframes_json: Option<PathBuf>,
    pub(crate) batch_size: usize,
    pub(crate) price_scale: f64,
    pub(crate) late_policy: LatePolicy,
    pub(crate) output_dir: PathBuf,
    pub(crate) format: Format,
}

impl BuildArgs {
    /// Returns the run input, from `--name` or the file's own name.
    fn run_input(&self) -> Result<RunInput> {
        let name = match &self.name {
            Some(name) => name.as_str(),
            None => self
                .file
                .file_name()
                .and_then(|n| n.to_str())
                .with_context(|| format!("Invalid file path: {}", self.file.display()))?,
        };
        Ok(RunInput::from_file_name(name)?)
    }

    /// Builds the run configuration, restricted to the requested labels.
    fn run_config(&self) -> Result<RunConfig> {
        let menu = load_timeframes(self.timeframes_json.as_deref())?;
        let timeframes = if self.timeframes.is_empty() {
            menu
        } else {
            menu.select(&self.timeframes)?
        };

        let config = RunConfig::default()
            .with_batch_size(self.batch_size)
            .with_bounds(self.bounds)
            .with_price_scale(self.price_scale)
            .with_timeframes(timeframes)
            .with_late_policy(self.late_policy);
        config.validate()?;
        Ok(config)
    }
}

/// Aggregate a tick file and write every requested series.
pub(crate) async fn build(args: BuildArgs, quiet: bool) -> Result<()> {
    let input = args.run_input()?;
    let config = args.run_config()?;
    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create {}", args.output_dir.display()))?;

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb.set_message(format!("{} reading {}", input.root, args.file.display()));
        pb
    };

    let mut reader = CsvBatchReader::open(&args.file, config.batch_size)
        .await
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let output = build_bars_with_progress(&mut reader, &input, &config, |p| {
        progress.set_message(format!(
            "{} batches, {} rows, {} ticks, {} buffered",
            p.batches, p.rows, p.ticks, p.buffered
        ));
    })
    .await
    .with_context(|| format!("Failed to aggregate {}", args.file.display()))?;

    progress.finish_with_message(format!(
        "Aggregated {} ticks for {}",
        output.stats.ticks(),
        output.contract
    ));

    let mut written = Vec::with_capacity(config.timeframes.len());
    for (label, rule) in config.timeframes.iter() {
        let bars = output.get(rule).map(BarSeries::as_slice).unwrap_or_default();
        let path = output_path(&args.output_dir, &input.root, label, args.format);
        write_series(bars, &path, args.format)?;
        info!(label, %rule, bars = bars.len(), path = %path.display(), "wrote series");
        written.push((label, rule, bars.len(), path));
    }

    if !quiet {
        print_summary(&output, &written);
    }

    Ok(())
}

fn print_summary(output: &AggregationOutput, written: &[(&str, Rule, usize, PathBuf)]) {
    let stats = &output.stats;

    println!("\n{:<10} {:<10} {:>10}  {}", "TIMEFRAME", "RULE", "BARS", "OUTPUT");
    println!("{}", "-".repeat(60));
    for (label, rule, bars, path) in written {
        println!("{:<10} {:<10} {:>10}  {}", label, rule.to_string(), bars, path.display());
    }

    println!("\nContract:        {}", output.contract);
    println!("Batches:         {} ({} empty)", stats.batches, stats.skipped_batches);
    println!("Rows:            {}", stats.sanitize.rows);
    println!("Ticks:           {}", stats.ticks());
    println!("Malformed:       {}", stats.sanitize.malformed);
    println!("Other symbols:   {}", stats.sanitize.symbol_mismatch);
    println!("Out of bounds:   {}", stats.sanitize.out_of_bounds);
    if stats.late_ticks() > 0 {
        println!("Late (dropped):  {}", stats.late_ticks());
    }
}
