//! Benchmark utilities for tickbars.
//!
//! Generates reproducible synthetic tick streams so benchmarks do not depend
//! on market data files.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tickbars_lib::Tick;

/// Shape of a synthetic tick stream.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Number of ticks to generate.
    pub ticks: usize,
    /// Timestamp of the first tick.
    pub start: DateTime<Utc>,
    /// Largest gap between consecutive ticks, in milliseconds.
    pub max_gap_ms: u64,
    /// Starting price.
    pub base_price: f64,
    /// Generator seed.
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            ticks: 100_000,
            start: Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).single().unwrap_or_default(),
            max_gap_ms: 500,
            base_price: 18_000.0,
            seed: 0x9E37_79B9_7F4A_7C15,
        }
    }
}

/// Generates an ascending random-walk tick stream.
pub fn synthetic_ticks(config: &SyntheticConfig) -> Vec<Tick> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut timestamp = config.start;
    let mut price = config.base_price;

    (0..config.ticks)
        .map(|_| {
            let gap = rng.random_range(0..config.max_gap_ms.max(1));
            timestamp += TimeDelta::milliseconds(gap as i64);
            price += f64::from(rng.random_range(0_u8..9)) * 0.25 - 1.0;
            Tick::new(timestamp, price)
        })
        .collect()
}

/// Writes ticks as a tick CSV with fixed-point nano prices.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_tick_csv(path: &Path, ticks: &[Tick], symbol: &str) -> io::Result<()> {
    let mut out = BufWriter::new(std::fs::File::create(path)?);
    writeln!(out, "ts_event,rtype,publisher_id,instrument_id,action,side,price,size,symbol")?;
    for tick in ticks {
        writeln!(
            out,
            "{},0,1,42,T,N,{},1,{symbol}",
            tick.timestamp.format("%Y-%m-%dT%H:%M:%S%.9fZ"),
            (tick.price * 1e9).round() as i64
        )?;
    }
    out.flush()
}

/// A synthetic tick file inside a temporary directory.
#[derive(Debug)]
pub struct TickFile {
    _dir: TempDir,
    path: PathBuf,
}

impl TickFile {
    /// Generates `NQ_2024_03.csv` with ticks for the March contract.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be written.
    pub fn generate(config: &SyntheticConfig) -> io::Result<Self> {
        let dir = TempDir::new()?;
        let path = dir.path().join("NQ_2024_03.csv");
        write_tick_csv(&path, &synthetic_ticks(config), "NQH4")?;
        Ok(Self { _dir: dir, path })
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_ticks_ascending() {
        let ticks = synthetic_ticks(&SyntheticConfig {
            ticks: 1_000,
            ..SyntheticConfig::default()
        });
        assert_eq!(ticks.len(), 1_000);
        assert!(ticks.is_sorted_by_key(|t| t.timestamp));
    }

    #[test]
    fn test_synthetic_ticks_reproducible() {
        let config = SyntheticConfig {
            ticks: 500,
            ..SyntheticConfig::default()
        };
        assert_eq!(synthetic_ticks(&config), synthetic_ticks(&config));

        let other = synthetic_ticks(&SyntheticConfig { seed: 1, ..config.clone() });
        assert_ne!(synthetic_ticks(&config), other);
    }

    #[test]
    fn test_tick_file_header() {
        let file = TickFile::generate(&SyntheticConfig {
            ticks: 3,
            ..SyntheticConfig::default()
        })
        .unwrap();
        let text = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().nth(1).unwrap().ends_with(",NQH4"));
    }
}
