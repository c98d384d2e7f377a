//! Display utilities and output formatting for the tickbars CLI.

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tickbars_lib::prelude::*;

/// Output format for bar series.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Json,
    Ndjson,
    Parquet,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => Self::Csv,
            Format::Json => Self::Json,
            Format::Ndjson => Self::Ndjson,
            Format::Parquet => Self::Parquet,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", OutputFormat::from(*self))
    }
}

/// Loads a timeframe map from a JSON file, or the default menu.
pub(crate) fn load_timeframes(path: Option<&Path>) -> Result<TimeframeMap> {
    let Some(path) = path else {
        return Ok(TimeframeMap::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read timeframes from {}", path.display()))?;
    TimeframeMap::from_json(&json)
        .with_context(|| format!("Invalid timeframes in {}", path.display()))
}

/// Returns `<dir>/<ROOT>_<label>.<ext>`.
pub(crate) fn output_path(dir: &Path, root: &str, label: &str, format: Format) -> PathBuf {
    dir.join(format!("{root}_{label}.{}", OutputFormat::from(format).extension()))
}

/// Write OHLCV bars to a file in the specified format.
pub(crate) fn write_series(bars: &[Ohlcv], output: &Path, format: Format) -> Result<()> {
    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    OutputFormat::from(format).write_bars(bars, BufWriter::new(file))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_path() {
        let path = output_path(Path::new("out"), "NQ", "15m", Format::Parquet);
        assert_eq!(path, Path::new("out").join("NQ_15m.parquet"));
    }

    #[test]
    fn test_load_timeframes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tf.json");
        std::fs::write(&path, r#"{"3m": "180s", "1m": "60s"}"#).unwrap();

        let map = load_timeframes(Some(&path)).unwrap();
        let labels: Vec<_> = map.iter().map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["1m", "3m"]);

        std::fs::write(&path, r#"{"3m": "3 minutes"}"#).unwrap();
        assert!(load_timeframes(Some(&path)).is_err());
        assert_eq!(load_timeframes(None).unwrap(), TimeframeMap::default());
    }

    #[test]
    fn test_write_empty_series_csv() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("NQ_1m.csv");
        write_series(&[], &path, Format::Csv).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "timestamp,open,high,low,close,volume\n");
    }
}
